// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The managed `<style>` element.

use canvas_a11y_core::mode::StyleSink;
use web_sys::Document;

/// Owns one `<style>` element in the document head, identified by id.
#[derive(Debug)]
pub struct StyleElement {
    document: Document,
    id: String,
}

impl StyleElement {
    /// Creates a sink that manages the `<style id="{id}">` element.
    #[must_use]
    pub fn new(document: Document, id: impl Into<String>) -> Self {
        Self {
            document,
            id: id.into(),
        }
    }

    /// Returns the text of the managed stylesheet, if one is installed.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.document
            .get_element_by_id(&self.id)
            .and_then(|element| element.text_content())
    }
}

impl StyleSink for StyleElement {
    fn replace_stylesheet(&mut self, css: &str) {
        if let Some(previous) = self.document.get_element_by_id(&self.id) {
            previous.remove();
        }
        let Some(head) = self.document.head() else {
            log::error!("document has no <head>, stylesheet not installed");
            return;
        };
        let style = match self.document.create_element("style") {
            Ok(style) => style,
            Err(err) => {
                log::error!(
                    "could not create <style>: {}",
                    crate::runtime::describe(&err)
                );
                return;
            }
        };
        style.set_id(&self.id);
        style.set_text_content(Some(css));
        if let Err(err) = head.append_child(&style) {
            log::error!(
                "could not install stylesheet: {}",
                crate::runtime::describe(&err)
            );
        }
    }
}
