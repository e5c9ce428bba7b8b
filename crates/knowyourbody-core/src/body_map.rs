//! Clickable body diagram: regions, their outlines, and the prompts they send.
//!
//! Geometry lives in the diagram's own coordinate space (its view box), so a
//! front end only has to scale a pointer position into view-box units and ask
//! [`region_at`].

use serde::{Deserialize, Serialize};

/// Width and height of the diagram's view box.
pub const VIEW_BOX: (f32, f32) = (327.32, 833.79);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyRegion {
    Head,
    Chest,
    Abdomen,
    RightArm,
    LeftArm,
    RightLeg,
    LeftLeg,
}

/// Axis-aligned outline in view-box units. Contains `[x, x + width)` by
/// `[y, y + height)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

impl BodyRegion {
    /// Every region, in diagram order.
    pub const ALL: [BodyRegion; 7] = [
        BodyRegion::Head,
        BodyRegion::Chest,
        BodyRegion::Abdomen,
        BodyRegion::RightArm,
        BodyRegion::LeftArm,
        BodyRegion::RightLeg,
        BodyRegion::LeftLeg,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BodyRegion::Head => "Head",
            BodyRegion::Chest => "Chest",
            BodyRegion::Abdomen => "Abdomen",
            BodyRegion::RightArm => "Right Arm",
            BodyRegion::LeftArm => "Left Arm",
            BodyRegion::RightLeg => "Right Leg",
            BodyRegion::LeftLeg => "Left Leg",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(label.trim()))
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            BodyRegion::Head => Bounds::new(98.57, 0.0, 130.18, 115.82),
            BodyRegion::Chest => Bounds::new(71.84, 154.7, 183.64, 174.05),
            BodyRegion::Abdomen => Bounds::new(61.71, 334.33, 203.91, 176.49),
            // Arms are tilted outlines; these are their extents, clipped to
            // the view box. Both overlap the torso.
            BodyRegion::RightArm => Bounds::new(213.44, 153.28, 113.88, 230.63),
            BodyRegion::LeftArm => Bounds::new(0.0, 152.46, 119.76, 230.63),
            BodyRegion::RightLeg => Bounds::new(163.66, 516.4, 79.65, 317.39),
            BodyRegion::LeftLeg => Bounds::new(83.65, 516.4, 80.01, 317.39),
        }
    }

    /// Prompt sent when this region is selected.
    pub fn prompt(&self) -> String {
        region_prompt(self.label())
    }

    /// Next region in diagram order, wrapping around.
    pub fn next(&self) -> Self {
        let i = self.index();
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let i = self.index();
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|r| r == self).unwrap_or(0)
    }
}

impl std::fmt::Display for BodyRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// `"Tell me about the <label> in the context of general health."`
pub fn region_prompt(label: &str) -> String {
    format!("Tell me about the {} in the context of general health.", label)
}

/// Region under a point given in view-box units. Where outlines overlap,
/// the one later in diagram order is on top and wins.
pub fn region_at(x: f32, y: f32) -> Option<BodyRegion> {
    BodyRegion::ALL
        .into_iter()
        .rev()
        .find(|r| r.bounds().contains(x, y))
}
