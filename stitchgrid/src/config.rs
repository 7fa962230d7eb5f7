use crate::error::{Error, Result};
use crate::limits::{self, CANVAS_MAX, SPACING_MAX};
use crate::model::{is_valid_token, Color, StitchKind};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomStitch {
    pub name: String,
    #[serde(with = "hex_color")]
    pub color: Color,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinearDirection {
    /// Row 0 at the bottom, later rows stacked upward.
    #[default]
    BottomUp,
    /// Row 0 at the top, later rows stacked downward.
    TopDown,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsForces {
    /// Many-body strength, negative repels.
    pub charge: f32,
    pub collide_radius: f32,
    pub velocity_decay: f32,
    pub alpha_min: f32,
}

impl Default for PhysicsForces {
    fn default() -> Self {
        PhysicsForces { charge: -50.0, collide_radius: 15.0, velocity_decay: 0.4, alpha_min: 0.001 }
    }
}

/// Chart options supplied by the host application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
    pub vertical_spacing: f32,
    pub horizontal_spacing: f32,
    pub round_spacing: f32,
    pub stitch_size: f32,
    pub x_start: f32,
    pub y_start: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,
    #[serde(with = "hex_color")]
    pub ch_color: Color,
    #[serde(with = "hex_color")]
    pub sc_color: Color,
    #[serde(with = "hex_color")]
    pub dc_color: Color,
    pub custom_stitches: Vec<CustomStitch>,
    /// Degrees swept by one round.
    pub round_total_angle: f32,
    pub expert_view: bool,
    pub stitches_done: u32,
    pub is_playing: bool,
    pub linear_direction: LinearDirection,
    pub physics: PhysicsForces,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            vertical_spacing: 15.0,
            horizontal_spacing: 15.0,
            round_spacing: 50.0,
            stitch_size: 30.0,
            x_start: 50.0,
            y_start: 50.0,
            canvas_width: 800.0,
            canvas_height: 600.0,
            ch_color: Color::rgb(0x00, 0xDC, 0x00),
            sc_color: Color::rgb(0x00, 0xC8, 0x00),
            dc_color: Color::rgb(0x00, 0xAA, 0x00),
            custom_stitches: Vec::new(),
            round_total_angle: 360.0,
            expert_view: false,
            stitches_done: 0,
            is_playing: false,
            linear_direction: LinearDirection::BottomUp,
            physics: PhysicsForces::default(),
        }
    }
}

impl ChartConfig {
    pub fn from_json_str(s: &str) -> Result<ChartConfig> {
        let cfg: ChartConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_value(v: serde_json::Value) -> Result<ChartConfig> {
        let cfg: ChartConfig = serde_json::from_value(v)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        limits::check_range("verticalSpacing", self.vertical_spacing, 0.0, SPACING_MAX)?;
        limits::check_range("horizontalSpacing", self.horizontal_spacing, 0.0, SPACING_MAX)?;
        limits::check_range("roundSpacing", self.round_spacing, 0.0, SPACING_MAX)?;
        limits::check_range("stitchSize", self.stitch_size, 1.0, SPACING_MAX)?;
        limits::check_range("xStart", self.x_start, -CANVAS_MAX, CANVAS_MAX)?;
        limits::check_range("yStart", self.y_start, -CANVAS_MAX, CANVAS_MAX)?;
        limits::check_range("canvasWidth", self.canvas_width, 1.0, CANVAS_MAX)?;
        limits::check_range("canvasHeight", self.canvas_height, 1.0, CANVAS_MAX)?;
        limits::check_range("roundTotalAngle", self.round_total_angle, -360.0, 360.0)?;
        limits::check_range("physics.charge", self.physics.charge, -SPACING_MAX, SPACING_MAX)?;
        limits::check_range("physics.collideRadius", self.physics.collide_radius, 0.0, SPACING_MAX)?;
        limits::check_range("physics.velocityDecay", self.physics.velocity_decay, 0.0, 1.0)?;
        limits::check_range("physics.alphaMin", self.physics.alpha_min, 1e-6, 1.0)?;
        if let Some(bad) = self.custom_stitches.iter().find(|s| !is_valid_token(&s.name)) {
            return Err(Error::InvalidStitch(bad.name.clone()));
        }
        Ok(())
    }

    /// Step between adjacent columns.
    pub fn column_step(&self) -> f32 {
        self.stitch_size + self.horizontal_spacing
    }

    /// Step between adjacent rows.
    pub fn row_step(&self) -> f32 {
        self.stitch_size + self.vertical_spacing
    }

    pub fn center(&self) -> (f32, f32) {
        (self.canvas_width / 2.0, self.canvas_height / 2.0)
    }

    pub fn custom_color(&self, token: &str) -> Option<Color> {
        self.custom_stitches.iter().find(|s| s.name == token).map(|s| s.color)
    }

    /// Fill for a stitch: built-in type colors, then custom stitches, else gray.
    pub fn stitch_color(&self, token: &str) -> Color {
        match StitchKind::of(token) {
            StitchKind::Chain => self.ch_color,
            StitchKind::Single => self.sc_color,
            StitchKind::Double => self.dc_color,
            _ => self.custom_color(token).unwrap_or(Color::GRAY),
        }
    }

    /// `[ch, sc, dc, ...custom]`, the order the type cycle walks.
    pub fn stitch_cycle(&self) -> Vec<String> {
        let mut types: Vec<String> = vec!["ch".into(), "sc".into(), "dc".into()];
        types.extend(self.custom_stitches.iter().map(|s| s.name.clone()));
        types
    }
}

mod hex_color {
    use crate::model::Color;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(c: &Color, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&c.to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Color, D::Error> {
        let s = String::deserialize(d)?;
        Color::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
