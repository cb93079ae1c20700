use crate::series::RenderSeries;

/// Pixel <-> data-domain mapping, supplied by the rendering surface.
pub trait CoordinateMap {
    fn pixel_to_data(&self, pixel: (f64, f64)) -> (f64, f64);
    fn data_to_pixel(&self, data: (f64, f64)) -> (f64, f64);
}

/// Where the probe currently reads. Derived per pointer event, never
/// persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProbeState {
    /// True only while the pointer is engaged (press-and-hold or drag).
    pub is_active: bool,
    pub data_x: f64,
    pub data_y: f64,
}

/// Maps live pointer positions over the rendered series to data values.
///
/// `data_y` snaps to the nearest sampled point by x rather than
/// interpolating; when the series is empty the surface's own mapping is
/// passed through unchanged. Every operation is cheap enough to run on
/// each position update.
#[derive(Debug, Default)]
pub struct ProbeMapper {
    state: ProbeState,
}

impl ProbeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    /// Pointer pressed at `pixel`; engages the probe.
    pub fn press(&mut self, map: &dyn CoordinateMap, series: &RenderSeries, pixel: (f64, f64)) {
        self.state = Self::probe_at(map, series, pixel);
    }

    /// Pointer moved while engaged; same mapping as a press.
    pub fn drag(&mut self, map: &dyn CoordinateMap, series: &RenderSeries, pixel: (f64, f64)) {
        self.state = Self::probe_at(map, series, pixel);
    }

    /// Pointer released; the probe disengages but keeps its last reading.
    pub fn release(&mut self) {
        self.state.is_active = false;
    }

    fn probe_at(
        map: &dyn CoordinateMap,
        series: &RenderSeries,
        pixel: (f64, f64),
    ) -> ProbeState {
        let (data_x, data_y) = map.pixel_to_data(pixel);
        let (data_x, data_y) = match series.nearest_by_x(data_x) {
            Some(point) => (point.x, point.y),
            None => (data_x, data_y),
        };
        ProbeState {
            is_active: true,
            data_x,
            data_y,
        }
    }
}

/// Affine mapping between a pixel rectangle and a data rectangle, with
/// pixel y growing downward. Reference implementation for tests and
/// demos; real surfaces supply their own.
#[derive(Clone, Copy, Debug)]
pub struct LinearMap {
    pub x_data: (f64, f64),
    pub y_data: (f64, f64),
    pub width_px: f64,
    pub height_px: f64,
}

impl CoordinateMap for LinearMap {
    fn pixel_to_data(&self, pixel: (f64, f64)) -> (f64, f64) {
        let (x0, x1) = self.x_data;
        let (y0, y1) = self.y_data;
        let x = x0 + pixel.0 / self.width_px * (x1 - x0);
        let y = y1 - pixel.1 / self.height_px * (y1 - y0);
        (x, y)
    }

    fn data_to_pixel(&self, data: (f64, f64)) -> (f64, f64) {
        let (x0, x1) = self.x_data;
        let (y0, y1) = self.y_data;
        let px = (data.0 - x0) / (x1 - x0) * self.width_px;
        let py = (y1 - data.1) / (y1 - y0) * self.height_px;
        (px, py)
    }
}
