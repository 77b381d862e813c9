// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element-list payloads sent by the embedded runtime.
//!
//! One payload is the unit of a synchronization exchange: a JSON object with
//! an `elements` array of [`ElementDescriptor`]s in physical pixels. Parsing
//! is all-or-nothing. A payload with any malformed descriptor is rejected
//! as a whole so the overlay never shows half of a list.

use alloc::string::{String, ToString as _};
use alloc::vec::Vec;
use core::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::geometry::PhysicalRect;

/// Opaque identifier the runtime uses to route proxy clicks back to a widget.
///
/// The runtime may send a string or a number; either is kept as its
/// textual form, which is what goes back over the bridge.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
    /// Creates an id from its textual form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as sent back to the runtime.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({:?})", self.0)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = ElementId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or numeric element id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ElementId, E> {
                Ok(ElementId(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<ElementId, E> {
                Ok(ElementId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ElementId, E> {
                Ok(ElementId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ElementId, E> {
                Ok(ElementId(v.to_string()))
            }

            // Also reached for integers outside the `i64`/`u64` range.
            fn visit_f64<E: de::Error>(self, v: f64) -> Result<ElementId, E> {
                if v.is_finite() {
                    Ok(ElementId(v.to_string()))
                } else {
                    Err(E::invalid_value(de::Unexpected::Float(v), &self))
                }
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// One accessible widget as described by the runtime.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ElementDescriptor {
    /// Routing id for click notifications.
    pub id: ElementId,
    /// Accessible name, used verbatim.
    pub label: String,
    /// Left edge in physical pixels.
    pub x: f64,
    /// Top edge in physical pixels.
    pub y: f64,
    /// Width in physical pixels.
    pub width: f64,
    /// Height in physical pixels.
    pub height: f64,
}

impl ElementDescriptor {
    /// Returns the descriptor's bounds in the runtime's physical pixels.
    #[must_use]
    pub const fn physical_rect(&self) -> PhysicalRect {
        PhysicalRect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// A full element list, as received in one synchronization exchange.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementList {
    /// Descriptors in payload order.
    pub elements: Vec<ElementDescriptor>,
}

#[derive(Deserialize)]
struct RawElementList {
    #[serde(default)]
    elements: Option<Vec<ElementDescriptor>>,
}

/// Why a payload was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// The text is not JSON, or a descriptor is missing a field or has the
    /// wrong type.
    #[error("invalid element list: {0}")]
    Json(String),
    /// The top-level value is not an object.
    #[error("element list must be a JSON object")]
    NotAnObject,
}

impl ElementList {
    /// Parses and validates a serialized payload.
    ///
    /// A missing or `null` `elements` key yields an empty list. Negative
    /// widths and heights are clamped to zero.
    pub fn parse(text: &str) -> Result<Self, PayloadError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|err| PayloadError::Json(err.to_string()))?;
        if !value.is_object() {
            return Err(PayloadError::NotAnObject);
        }
        let raw: RawElementList =
            serde_json::from_value(value).map_err(|err| PayloadError::Json(err.to_string()))?;
        let mut elements = raw.elements.unwrap_or_default();

        for element in elements.iter_mut().filter(|e| e.width < 0.0 || e.height < 0.0) {
            log::warn!(
                "element {} has a negative size {}x{}, clamped to zero",
                element.id,
                element.width,
                element.height,
            );
            element.width = element.width.max(0.0);
            element.height = element.height.max(0.0);
        }
        Ok(Self { elements })
    }

    /// Number of descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the list has no descriptors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_descriptors_in_order() {
        let list = ElementList::parse(
            r#"{"elements":[
                {"id":"play","label":"Play","x":100,"y":200,"width":50,"height":20},
                {"id":7,"label":"","x":0.5,"y":1,"width":2,"height":3}
            ]}"#,
        )
        .unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.elements[0].id.as_str(), "play");
        assert_eq!(list.elements[0].label, "Play");
        assert_eq!(list.elements[1].id.as_str(), "7");
        assert_eq!(list.elements[1].label, "");
        assert_eq!(list.elements[1].x, 0.5);
    }

    #[test]
    fn missing_or_null_elements_is_empty() {
        assert!(ElementList::parse("{}").unwrap().is_empty());
        assert!(ElementList::parse(r#"{"elements":null}"#).unwrap().is_empty());
        assert!(ElementList::parse(r#"{"version":3}"#).unwrap().is_empty());
    }

    #[test]
    fn unknown_descriptor_fields_are_ignored() {
        let list = ElementList::parse(
            r#"{"elements":[{"id":"a","label":"A","x":0,"y":0,"width":1,"height":1,"role":"button"}]}"#,
        )
        .unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn rejects_text_that_is_not_json() {
        assert!(matches!(
            ElementList::parse("{elements: [oops"),
            Err(PayloadError::Json(_))
        ));
        assert!(matches!(ElementList::parse(""), Err(PayloadError::Json(_))));
    }

    #[test]
    fn rejects_non_object_payloads() {
        assert_eq!(
            ElementList::parse(r#"[{"elements":[]}]"#),
            Err(PayloadError::NotAnObject)
        );
        assert_eq!(ElementList::parse("42"), Err(PayloadError::NotAnObject));
    }

    #[test]
    fn one_bad_descriptor_rejects_the_whole_list() {
        let missing_label = r#"{"elements":[
            {"id":"a","label":"A","x":0,"y":0,"width":1,"height":1},
            {"id":"b","x":0,"y":0,"width":1,"height":1}
        ]}"#;
        assert!(matches!(
            ElementList::parse(missing_label),
            Err(PayloadError::Json(_))
        ));

        let wrong_type = r#"{"elements":[{"id":"a","label":"A","x":"0","y":0,"width":1,"height":1}]}"#;
        assert!(matches!(
            ElementList::parse(wrong_type),
            Err(PayloadError::Json(_))
        ));

        let elements_not_array = r#"{"elements":"none"}"#;
        assert!(matches!(
            ElementList::parse(elements_not_array),
            Err(PayloadError::Json(_))
        ));
    }

    #[test]
    fn negative_sizes_are_clamped_to_zero() {
        let list = ElementList::parse(
            r#"{"elements":[
                {"id":"neg","label":"N","x":4,"y":5,"width":-1,"height":3},
                {"id":"ok","label":"O","x":0,"y":0,"width":2,"height":-0.5}
            ]}"#,
        )
        .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.elements[0].physical_rect(),
            PhysicalRect {
                x: 4.0,
                y: 5.0,
                width: 0.0,
                height: 3.0
            }
        );
        assert_eq!(list.elements[1].width, 2.0);
        assert_eq!(list.elements[1].height, 0.0);
    }

    #[test]
    fn numeric_ids_keep_their_textual_form() {
        let list = ElementList::parse(
            r#"{"elements":[
                {"id":3.0,"label":"A","x":0,"y":0,"width":1,"height":1},
                {"id":2.5,"label":"B","x":0,"y":0,"width":1,"height":1},
                {"id":-4,"label":"C","x":0,"y":0,"width":1,"height":1},
                {"id":123456789012345678901234,"label":"D","x":0,"y":0,"width":1,"height":1}
            ]}"#,
        )
        .unwrap();
        let ids: Vec<&str> = list.elements.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids[..3], ["3", "2.5", "-4"]);
        assert!(!ids[3].is_empty());
    }

    #[test]
    fn non_scalar_ids_reject_the_list() {
        assert!(matches!(
            ElementList::parse(
                r#"{"elements":[{"id":{"a":1},"label":"A","x":0,"y":0,"width":1,"height":1}]}"#
            ),
            Err(PayloadError::Json(_))
        ));
    }

    #[test]
    fn labels_are_kept_verbatim() {
        let list = ElementList::parse(
            r#"{"elements":[{"id":"a","label":"  <b>Start</b> é  ","x":0,"y":0,"width":1,"height":1}]}"#,
        )
        .unwrap();
        assert_eq!(list.elements[0].label, "  <b>Start</b> \u{e9}  ");
    }
}
