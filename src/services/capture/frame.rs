use super::r#trait::CaptureSession;
use super::region::CaptureRegion;
use crate::error::CaptureFault;

pub const BYTES_PER_PIXEL: usize = 4;

/// Кадр: 4 байта на пиксель, построчно. Первые три канала - цвет, четвёртый - альфа.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CaptureFault> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(CaptureFault::MalformedFrame {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Кадр, залитый одним цветом
    #[allow(dead_code)]
    pub fn filled(width: u32, height: u32, pixel: [u8; 4]) -> Self {
        let data = pixel.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            data,
        }
    }

    #[allow(dead_code)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[allow(dead_code)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[allow(dead_code)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[allow(dead_code)]
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        self.data.get_mut(offset..offset + BYTES_PER_PIXEL)
    }

    /// Есть ли хотя бы один пиксель с тремя цветовыми каналами, равными 255.
    /// Без ветвлений внутри цикла, чтобы компилятор мог векторизовать проход.
    pub fn has_white(&self) -> bool {
        self.data
            .chunks_exact(BYTES_PER_PIXEL)
            .fold(false, |found, px| found | (px[0] & px[1] & px[2] == u8::MAX))
    }
}

/// Захватить `region` и проверить его на белые пиксели.
/// Ошибка означает сбой сессии, а не отсутствие белого.
pub fn capture_has_white<S: CaptureSession + ?Sized>(
    session: &mut S,
    region: &CaptureRegion,
) -> Result<bool, CaptureFault> {
    let frame = session.grab(region)?;
    Ok(frame.has_white())
}
