use crate::core::utils::safety::{all_finite, clamp_unit};

/// 8-bit RGB; alpha travels with each command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// From 0..1 channels (star colors come out of the kernels this way).
    pub fn from_unit(r: f32, g: f32, b: f32) -> Self {
        #[inline]
        fn channel(v: f32) -> u8 {
            (clamp_unit(v) * 255.0).round() as u8
        }
        Self { r: channel(r), g: channel(g), b: channel(b) }
    }

    pub fn css(&self, alpha: f32) -> String {
        format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, alpha)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole surface. `alpha < 1` leaves fading trails.
    Clear { color: Color, alpha: f32 },
    Circle { x: f32, y: f32, radius: f32, color: Color, alpha: f32 },
    /// Radial gradient from `color` at the center to transparent at `radius`.
    Glow { x: f32, y: f32, radius: f32, color: Color, alpha: f32 },
    Line { x0: f32, y0: f32, x1: f32, y1: f32, width: f32, color: Color, alpha: f32 },
}

impl DrawCommand {
    fn is_finite(&self) -> bool {
        match *self {
            DrawCommand::Clear { alpha, .. } => alpha.is_finite(),
            DrawCommand::Circle { x, y, radius, alpha, .. } | DrawCommand::Glow { x, y, radius, alpha, .. } => {
                all_finite(&[x, y, radius, alpha])
            }
            DrawCommand::Line { x0, y0, x1, y1, width, alpha, .. } => all_finite(&[x0, y0, x1, y1, width, alpha]),
        }
    }

    /// Negative radii/widths would throw in the host; alpha outside [0, 1]
    /// is meaningless.
    fn sanitized(self) -> Self {
        match self {
            DrawCommand::Clear { color, alpha } => DrawCommand::Clear { color, alpha: alpha.clamp(0.0, 1.0) },
            DrawCommand::Circle { x, y, radius, color, alpha } => {
                DrawCommand::Circle { x, y, radius: radius.max(0.0), color, alpha: alpha.clamp(0.0, 1.0) }
            }
            DrawCommand::Glow { x, y, radius, color, alpha } => {
                DrawCommand::Glow { x, y, radius: radius.max(0.0), color, alpha: alpha.clamp(0.0, 1.0) }
            }
            DrawCommand::Line { x0, y0, x1, y1, width, color, alpha } => DrawCommand::Line {
                x0,
                y0,
                x1,
                y1,
                width: width.max(0.0),
                color,
                alpha: alpha.clamp(0.0, 1.0),
            },
        }
    }
}

/// Per-frame command buffer. Backends replay it; nothing non-finite ever
/// gets in.
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
    dropped: u32,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame, keeping the allocation.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.dropped = 0;
    }

    /// False (and counted) if the command had a non-finite field.
    #[inline]
    pub fn push(&mut self, command: DrawCommand) -> bool {
        if !command.is_finite() {
            self.dropped += 1;
            return false;
        }
        self.commands.push(command.sanitized());
        true
    }

    pub fn clear(&mut self, color: Color, alpha: f32) -> bool {
        self.push(DrawCommand::Clear { color, alpha })
    }

    pub fn circle(&mut self, x: f32, y: f32, radius: f32, color: Color, alpha: f32) -> bool {
        self.push(DrawCommand::Circle { x, y, radius, color, alpha })
    }

    pub fn glow(&mut self, x: f32, y: f32, radius: f32, color: Color, alpha: f32) -> bool {
        self.push(DrawCommand::Glow { x, y, radius, color, alpha })
    }

    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, color: Color, alpha: f32) -> bool {
        self.push(DrawCommand::Line { x0, y0, x1, y1, width, color, alpha })
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_commands_are_dropped_and_counted() {
        let mut list = DrawList::new();
        assert!(list.circle(1.0, 2.0, 3.0, Color::WHITE, 0.5));
        assert!(!list.circle(f32::NAN, 2.0, 3.0, Color::WHITE, 0.5));
        assert!(!list.line(0.0, 0.0, f32::INFINITY, 1.0, 1.0, Color::WHITE, 1.0));
        assert!(!list.glow(0.0, 0.0, 4.0, Color::WHITE, f32::NAN));
        assert_eq!(list.len(), 1);
        assert_eq!(list.dropped(), 3);
        list.reset();
        assert!(list.is_empty());
        assert_eq!(list.dropped(), 0);
    }

    #[test]
    fn radius_and_alpha_are_sanitized() {
        let mut list = DrawList::new();
        list.circle(0.0, 0.0, -2.0, Color::BLACK, 3.0);
        assert_eq!(
            list.commands()[0],
            DrawCommand::Circle { x: 0.0, y: 0.0, radius: 0.0, color: Color::BLACK, alpha: 1.0 }
        );
    }

    #[test]
    fn colors_format_for_canvas() {
        assert_eq!(Color::rgb(10, 20, 30).css(0.5), "rgba(10,20,30,0.500)");
        assert_eq!(Color::from_unit(1.0, 0.0, f32::NAN), Color::rgb(255, 0, 0));
    }
}
