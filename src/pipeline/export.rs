use crate::common::landmark::LandmarkFrame;

/// One row of the landmark export: (frame_index, landmark_id, x, y, z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportRow {
    pub frame_index: u64,
    pub landmark_id: usize,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Append-only accumulator of landmark rows for later bulk export. The core
/// only appends; writing a CSV (or anything else) is the collaborator's job,
/// via `drain`.
#[derive(Debug, Default)]
pub struct ExportLog {
    rows: Vec<ExportRow>,
}

impl ExportLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_frame(&mut self, frame_index: u64, body: &LandmarkFrame) {
        for (landmark_id, point) in body.points().iter().enumerate() {
            self.rows.push(ExportRow {
                frame_index,
                landmark_id,
                x: point.x,
                y: point.y,
                z: point.z,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ExportRow] {
        &self.rows
    }

    /// Hand the accumulated rows to the exporter and reset the log.
    pub fn drain(&mut self) -> Vec<ExportRow> {
        std::mem::take(&mut self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::landmark::Point3;

    #[test]
    fn appends_one_row_per_landmark() {
        let mut log = ExportLog::new();
        let body = LandmarkFrame::new(vec![
            Point3::new(0.1, 0.2, 0.3),
            Point3::new(0.4, 0.5, 0.6),
        ]);
        log.append_frame(7, &body);
        assert_eq!(log.len(), 2);
        assert_eq!(log.rows()[1].frame_index, 7);
        assert_eq!(log.rows()[1].landmark_id, 1);
        assert_eq!(log.rows()[1].x, 0.4);
    }

    #[test]
    fn drain_empties_the_log() {
        let mut log = ExportLog::new();
        log.append_frame(0, &LandmarkFrame::new(vec![Point3::new(0.0, 0.0, 0.0)]));
        let rows = log.drain();
        assert_eq!(rows.len(), 1);
        assert!(log.is_empty());
    }
}
