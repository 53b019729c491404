//! Shared test utilities for integration tests
//!
//! Provides a small on-disk theme used by the discovery and CLI tests.
#![allow(dead_code)]

use assert_fs::prelude::*;

/// Write `text` at the root-relative `path` inside `tmp`.
pub fn write(
    tmp: &assert_fs::TempDir,
    path: &str,
    text: &str,
)
{
    tmp.child(path)
        .write_str(text)
        .expect("write fixture file");
}

/// A theme where:
/// - `price` is rendered only from `sections/hero.liquid`
/// - `hero` is used only by `templates/product.json`
/// - `collection.wholesale.json` uses the `banner` section
/// - the layout pulls in the `header` section and the `icon` snippet
pub fn make_theme() -> assert_fs::TempDir
{
    // Initialize the temporary theme root
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    write(
        &tmp,
        "layout/theme.liquid",
        "<html>{% section 'header' %}{{ content_for_layout }}{% render 'icon' %}</html>\n",
    );
    write(&tmp, "templates/product.liquid", "<h1>{{ product.title }}</h1>\n");
    write(
        &tmp,
        "templates/product.json",
        r#"{
  "sections": { "main": { "type": "hero" } },
  "order": ["main"]
}"#,
    );
    write(
        &tmp,
        "templates/collection.wholesale.json",
        r#"/* wholesale landing */
{
  "sections": { "top": { "type": "banner", "settings": {} } },
  "order": ["top"]
}"#,
    );
    write(&tmp, "sections/hero.liquid", "<div>{% render 'price' %}</div>\n");
    write(&tmp, "sections/banner.liquid", "<div>{{ section.settings.title }}</div>\n");
    write(&tmp, "sections/header.liquid", "<header>{{ shop.name }}</header>\n");
    write(&tmp, "snippets/price.liquid", "{{ product.price | money }}\n");
    write(&tmp, "snippets/icon.liquid", "<svg></svg>\n");
    write(&tmp, "assets/theme.css.liquid", "body { color: {{ settings.text }}; }\n");

    // Return the prepared theme to the caller
    tmp
}
