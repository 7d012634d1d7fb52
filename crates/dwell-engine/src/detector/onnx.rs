/// YOLOv8 person detection backed by ONNX Runtime
use super::Detector;
use crate::config::DetectorConfig;
use anyhow::{Context, Result};
use common::geometry::BoundingBox;
use common::tracking::VideoFrame;
use image::DynamicImage;
use ndarray::{Array, IxDyn};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::Value,
};

/// Detects people (COCO class 0) in decoded frames using a YOLOv8 ONNX
/// model. Inference runs on the CPU execution provider; the pipeline is
/// offline and sequential, so there is no batching.
pub struct OnnxPersonDetector {
    config: DetectorConfig,
    session: Session,
}

impl OnnxPersonDetector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(&config.model_path)
            .with_context(|| format!("failed to load ONNX model {}", config.model_path))?;

        tracing::info!(
            model = %config.model_path,
            confidence = config.confidence_threshold,
            iou = config.iou_threshold,
            input_size = config.input_size,
            "initialized person detector"
        );

        Ok(Self { config, session })
    }

    /// Resize and normalize a frame to the model's NCHW input layout.
    fn preprocess_image(&self, img: &DynamicImage) -> Array<f32, IxDyn> {
        let size = self.config.input_size;
        let resized = img.resize_exact(size, size, image::imageops::FilterType::Triangle);
        let rgb_img = resized.to_rgb8();

        let mut input = Array::zeros(IxDyn(&[1, 3, size as usize, size as usize]));
        for (x, y, pixel) in rgb_img.enumerate_pixels() {
            input[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
            input[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
            input[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
        }
        input
    }

    /// Parse YOLOv8 output ([batch, 84, 8400]) into person boxes scaled back
    /// to source pixels.
    fn parse_people(
        &self,
        output: &Array<f32, IxDyn>,
        original_width: u32,
        original_height: u32,
    ) -> Vec<(BoundingBox, f32)> {
        let scale_x = original_width as f32 / self.config.input_size as f32;
        let scale_y = original_height as f32 / self.config.input_size as f32;

        let num_predictions = output.shape()[2];
        let mut boxes = Vec::new();

        for i in 0..num_predictions {
            // Person class sits at score index 4 in the YOLOv8 layout.
            let person_score = output[[0, 4, i]];
            if person_score < self.config.confidence_threshold {
                continue;
            }

            let cx = output[[0, 0, i]];
            let cy = output[[0, 1, i]];
            let w = output[[0, 2, i]];
            let h = output[[0, 3, i]];

            let x = (((cx - w / 2.0) * scale_x).max(0.0)) as i64;
            let y = (((cy - h / 2.0) * scale_y).max(0.0)) as i64;
            let width = ((w * scale_x).min(original_width as f32)) as i64;
            let height = ((h * scale_y).min(original_height as f32)) as i64;

            let bbox = BoundingBox::new(x, y, width, height);
            if bbox.is_valid() {
                boxes.push((bbox, person_score));
            }
        }

        boxes
    }

    /// Non-maximum suppression on (box, score) pairs.
    fn nms(&self, mut boxes: Vec<(BoundingBox, f32)>) -> Vec<BoundingBox> {
        boxes.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut keep = Vec::new();
        while !boxes.is_empty() {
            let current = boxes.remove(0);
            boxes.retain(|candidate| iou(&current.0, &candidate.0) < self.config.iou_threshold);
            keep.push(current.0);
        }
        keep
    }
}

/// Intersection-over-union of two boxes.
fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = (a.x + a.width).min(b.x + b.width);
    let y2 = (a.y + a.height).min(b.y + b.height);

    let intersection = if x2 > x1 && y2 > y1 {
        ((x2 - x1) * (y2 - y1)) as f32
    } else {
        0.0
    };

    let union = (a.width * a.height + b.width * b.height) as f32 - intersection;
    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

impl Detector for OnnxPersonDetector {
    fn id(&self) -> &'static str {
        "onnx_person_detector"
    }

    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<BoundingBox>> {
        let img = image::load_from_memory(&frame.data)
            .with_context(|| format!("failed to decode frame {}", frame.sequence))?;

        let original_width = img.width();
        let original_height = img.height();

        let input_array = self.preprocess_image(&img);
        let input_tensor = Value::from_array(input_array)?;

        let outputs = self.session.run(ort::inputs![input_tensor])?;
        let output_value = outputs.get("output0").context("no output tensor found")?;
        let (shape, data) = output_value.try_extract_tensor::<f32>()?;

        let shape_usize: Vec<usize> = shape.as_ref().iter().map(|&x| x as usize).collect();
        let output = Array::from_shape_vec(IxDyn(&shape_usize), data.to_vec())?;
        drop(outputs);

        let candidates = self.parse_people(&output, original_width, original_height);
        Ok(self.nms(candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iou_disjoint() {
        let a = BoundingBox::new(0, 0, 10, 10);
        let b = BoundingBox::new(100, 100, 10, 10);
        assert_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn test_iou_identical() {
        let a = BoundingBox::new(10, 10, 40, 40);
        assert!((iou(&a, &a) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_iou_half_overlap() {
        // b covers the right half of a: intersection 50, union 150.
        let a = BoundingBox::new(0, 0, 10, 10);
        let b = BoundingBox::new(5, 0, 10, 10);
        let value = iou(&a, &b);
        assert!((value - 50.0 / 150.0).abs() < 1e-6);
    }
}
