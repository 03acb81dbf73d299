use crate::flight_control::CameraAngle;
use crate::util::{MAP_HEIGHT, MAP_WIDTH, Vec2D};
use chrono::{DateTime, Utc};
use std::{collections::VecDeque, path::PathBuf};

/// A time-boxed task requiring photographic coverage of a rectangular zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonedObjective {
    /// The unique identifier of the objective.
    id: usize,
    /// Start of the active window.
    start: DateTime<Utc>,
    /// Exclusive end of the active window.
    end: DateTime<Utc>,
    /// Zone as `[x_1, y_1, x_2, y_2]`; the zone may cross the map edge.
    zone: [i32; 4],
    /// Lens the photos have to be taken with.
    angle: CameraAngle,
    /// Secret objectives are listed without a usable zone.
    secret: bool,
    /// Required coverage fraction of the zone.
    coverage: f64,
}

impl ZonedObjective {
    pub fn new(
        id: usize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        zone: [i32; 4],
        angle: CameraAngle,
        secret: bool,
        coverage: f64,
    ) -> Self {
        Self { id, start, end, zone, angle, secret, coverage }
    }

    pub fn id(&self) -> usize { self.id }
    pub fn start(&self) -> DateTime<Utc> { self.start }
    pub fn end(&self) -> DateTime<Utc> { self.end }
    pub fn zone(&self) -> [i32; 4] { self.zone }
    pub fn angle(&self) -> CameraAngle { self.angle }
    pub fn is_secret(&self) -> bool { self.secret }
    pub fn coverage(&self) -> f64 { self.coverage }

    /// Whether `now` lies inside `[start, end)`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool { self.start <= now && now < self.end }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool { now >= self.end }

    /// Lower left corner of the zone.
    pub fn origin(&self) -> Vec2D<i32> { Vec2D::new(self.zone[0], self.zone[1]) }

    /// Width and height of the zone, measured in wrap direction when `x_2 < x_1`.
    #[allow(clippy::cast_possible_wrap)]
    pub fn extent(&self) -> Vec2D<i32> {
        let w = Vec2D::<i32>::wrap_coordinate(self.zone[2] - self.zone[0], MAP_WIDTH as i32);
        let h = Vec2D::<i32>::wrap_coordinate(self.zone[3] - self.zone[1], MAP_HEIGHT as i32);
        Vec2D::new(w, h)
    }

    /// Photo positions covering the zone in serpentine order.
    ///
    /// Neighbouring stops are at most one camera footprint apart so consecutive photos
    /// overlap; a zone smaller than the footprint yields a single centered stop.
    pub fn sweep_stops(&self) -> VecDeque<Vec2D<f64>> {
        let footprint = f64::from(self.angle.footprint());
        let origin = self.origin().to_f64();
        let extent = self.extent().to_f64();
        let xs = Self::axis_centers(origin.x(), extent.x(), footprint);
        let ys = Self::axis_centers(origin.y(), extent.y(), footprint);
        let mut stops = VecDeque::with_capacity(xs.len() * ys.len());
        for (row, y) in ys.iter().enumerate() {
            let row_xs: Box<dyn Iterator<Item = &f64>> =
                if row % 2 == 0 { Box::new(xs.iter()) } else { Box::new(xs.iter().rev()) };
            for x in row_xs {
                stops.push_back(Vec2D::new(*x, *y).wrap_around_map());
            }
        }
        stops
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn axis_centers(start: f64, len: f64, footprint: f64) -> Vec<f64> {
        if len <= footprint {
            return vec![start + len / 2.0];
        }
        let n = (len / footprint).ceil() as usize;
        let half = footprint / 2.0;
        let span = len - footprint;
        (0..n).map(|i| start + half + span * i as f64 / (n - 1) as f64).collect()
    }
}

/// Sweep state of the objective currently in service.
///
/// Kept across preemption so a resumed sweep continues where it stopped.
#[derive(Debug, Clone)]
pub struct ObjectiveProgress {
    objective: ZonedObjective,
    stops: VecDeque<Vec2D<f64>>,
    images: Vec<PathBuf>,
}

impl ObjectiveProgress {
    pub fn new(objective: ZonedObjective) -> Self {
        let stops = objective.sweep_stops();
        Self { objective, stops, images: Vec::new() }
    }

    pub fn objective(&self) -> &ZonedObjective { &self.objective }
    pub fn next_stop(&self) -> Option<Vec2D<f64>> { self.stops.front().copied() }
    pub fn remaining(&self) -> usize { self.stops.len() }
    pub fn images(&self) -> &[PathBuf] { &self.images }

    /// Marks the front stop as photographed.
    pub fn complete_stop(&mut self, image: PathBuf) {
        self.stops.pop_front();
        self.images.push(image);
    }

    /// Drops the front stop without a photo.
    pub fn skip_stop(&mut self) { self.stops.pop_front(); }
}
