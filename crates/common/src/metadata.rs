//! Metadata packet types handed back to the host sink.

use crate::rect::Rect;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value kinds understood by the host metadata sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Number,
}

/// One named attribute attached to an object metadata item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub kind: AttributeType,
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: AttributeType::String,
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn number(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: AttributeType::Number,
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One tracked object in an object metadata packet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub type_id: String,
    pub track_id: Uuid,
    pub bbox: Rect,
    pub confidence: f32,
    pub attributes: Vec<Attribute>,
}

/// One event item in an event metadata packet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    pub type_id: String,
    pub caption: String,
    pub description: String,
    /// For state-dependent events: true on the start edge, false on finish.
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMetadataPacket {
    pub timestamp_us: i64,
    pub items: Vec<ObjectMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadataPacket {
    pub timestamp_us: i64,
    pub items: Vec<EventMetadata>,
}

/// A unit of metadata produced by the worker, timestamped with the
/// ingestion frame's microsecond timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetadataPacket {
    Object(ObjectMetadataPacket),
    Event(EventMetadataPacket),
}

impl MetadataPacket {
    pub fn timestamp_us(&self) -> i64 {
        match self {
            MetadataPacket::Object(packet) => packet.timestamp_us,
            MetadataPacket::Event(packet) => packet.timestamp_us,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectMetadataPacket> {
        match self {
            MetadataPacket::Object(packet) => Some(packet),
            MetadataPacket::Event(_) => None,
        }
    }

    pub fn as_event(&self) -> Option<&EventMetadataPacket> {
        match self {
            MetadataPacket::Event(packet) => Some(packet),
            MetadataPacket::Object(_) => None,
        }
    }
}
