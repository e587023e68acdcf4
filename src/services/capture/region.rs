use std::fmt;

/// Геометрия основного монитора в абсолютных координатах
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayBounds {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl DisplayBounds {
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

impl fmt::Display for DisplayBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} @ ({}, {})", self.width, self.height, self.left, self.top)
    }
}

/// Квадрат `size x size` в центре монитора. Выход за границы не проверяется:
/// сигналом ошибки служит сбой захвата.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    pub fn centered(bounds: &DisplayBounds, size: u32) -> Self {
        let size = size.max(1);
        let half = (size / 2) as i64;
        let center_x = bounds.left as i64 + (bounds.width / 2) as i64;
        let center_y = bounds.top as i64 + (bounds.height / 2) as i64;

        Self {
            left: saturate(center_x - half),
            top: saturate(center_y - half),
            width: size,
            height: size,
        }
    }

    #[allow(dead_code)]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for CaptureRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} @ ({}, {})", self.width, self.height, self.left, self.top)
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
