use serde::{Deserialize, Serialize};

/// Room categories pass 1 can assign to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Bedroom,
    Bathroom,
    Kitchen,
    LivingRoom,
    DiningRoom,
    Hallway,
    Garage,
    Exterior,
    Unknown,
}

impl RoomType {
    pub const ALL: [RoomType; 9] = [
        RoomType::Bedroom,
        RoomType::Bathroom,
        RoomType::Kitchen,
        RoomType::LivingRoom,
        RoomType::DiningRoom,
        RoomType::Hallway,
        RoomType::Garage,
        RoomType::Exterior,
        RoomType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Bedroom => "bedroom",
            RoomType::Bathroom => "bathroom",
            RoomType::Kitchen => "kitchen",
            RoomType::LivingRoom => "living_room",
            RoomType::DiningRoom => "dining_room",
            RoomType::Hallway => "hallway",
            RoomType::Garage => "garage",
            RoomType::Exterior => "exterior",
            RoomType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// The closed set of defect features pass 2 is allowed to report.
/// Detections outside this whitelist are dropped with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureId {
    WaterDamage,
    Mold,
    BrokenFixture,
    StainedCarpet,
    CrackedTile,
}

pub const FEATURE_WHITELIST: [FeatureId; 5] = [
    FeatureId::WaterDamage,
    FeatureId::Mold,
    FeatureId::BrokenFixture,
    FeatureId::StainedCarpet,
    FeatureId::CrackedTile,
];

impl FeatureId {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureId::WaterDamage => "water_damage",
            FeatureId::Mold => "mold",
            FeatureId::BrokenFixture => "broken_fixture",
            FeatureId::StainedCarpet => "stained_carpet",
            FeatureId::CrackedTile => "cracked_tile",
        }
    }

    /// Parse a raw model-reported id against the whitelist.
    pub fn parse(value: &str) -> Option<FeatureId> {
        FEATURE_WHITELIST
            .iter()
            .copied()
            .find(|feature| feature.as_str() == value)
    }
}
