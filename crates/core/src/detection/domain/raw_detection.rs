/// Number of values per detection row in an SSD `DetectionOutput` tensor.
pub const DETECTION_ROW_LEN: usize = 7;

/// One record of an SSD-style detection output:
/// `[batch_id, class_id, confidence, xmin, ymin, xmax, ymax]`.
///
/// The box is normalized to `[0, 1]` relative to the model input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawDetection {
    pub batch_id: f32,
    pub class_id: f32,
    pub confidence: f32,
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl RawDetection {
    pub fn from_row(row: &[f32; DETECTION_ROW_LEN]) -> Self {
        Self {
            batch_id: row[0],
            class_id: row[1],
            confidence: row[2],
            xmin: row[3],
            ymin: row[4],
            xmax: row[5],
            ymax: row[6],
        }
    }
}

/// Parse a flat `[1, 1, N, 7]` output buffer into detections.
///
/// Rows are read in order until the first negative `batch_id`, which the
/// SSD output layer uses to mark the end of valid rows. A trailing partial
/// row is ignored.
pub fn parse_detections(flat: &[f32]) -> Vec<RawDetection> {
    flat.chunks_exact(DETECTION_ROW_LEN)
        .map(|chunk| {
            let mut row = [0.0f32; DETECTION_ROW_LEN];
            row.copy_from_slice(chunk);
            RawDetection::from_row(&row)
        })
        .take_while(|det| det.batch_id >= 0.0)
        .collect()
}
