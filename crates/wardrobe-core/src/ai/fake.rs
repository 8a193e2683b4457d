//! Scripted in-process stylist for unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{StylistBackend, TripPlanRequest, TryOnRequest};
use crate::types::{
    Angle, CriticVerdict, ImageData, ItemAnalysis, TripPlan, WardrobeError,
};

pub(crate) struct FakeStylist {
    /// Images whose first byte is in this set fail classification
    pub fail_markers: HashSet<u8>,
    pub trip_delay: Option<Duration>,
    pub trip_plan: Option<TripPlan>,
    pub fail_generation: bool,
    pub fail_critique: bool,
    pub classify_calls: AtomicUsize,
    pub trip_calls: AtomicUsize,
    pub critique_calls: AtomicUsize,
    /// Every try-on request received, in order
    pub generated: Mutex<Vec<TryOnRequest>>,
    pub last_trip_request: Mutex<Option<TripPlanRequest>>,
}

impl Default for FakeStylist {
    fn default() -> Self {
        Self {
            fail_markers: HashSet::new(),
            trip_delay: None,
            trip_plan: None,
            fail_generation: false,
            fail_critique: false,
            classify_calls: AtomicUsize::new(0),
            trip_calls: AtomicUsize::new(0),
            critique_calls: AtomicUsize::new(0),
            generated: Mutex::new(Vec::new()),
            last_trip_request: Mutex::new(None),
        }
    }
}

impl FakeStylist {
    pub fn generation_count(&self, angle: Angle) -> usize {
        self.generated
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.angle == angle)
            .count()
    }

    /// Reference image sent with each request, in order
    pub fn references(&self) -> Vec<(Angle, Option<ImageData>)> {
        self.generated
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.angle, r.reference.clone()))
            .collect()
    }
}

#[async_trait]
impl StylistBackend for FakeStylist {
    async fn classify_item(&self, image: &ImageData) -> Result<ItemAnalysis, WardrobeError> {
        self.classify_calls.fetch_add(1, Ordering::SeqCst);
        let marker = image.bytes.first().copied().unwrap_or_default();
        if self.fail_markers.contains(&marker) {
            return Err(WardrobeError::Ai("scripted failure".into()));
        }
        Ok(ItemAnalysis {
            category: "Top".into(),
            sub_category: format!("Shirt {}", marker),
            primary_color: "Blue".into(),
            season: "Summer".into(),
            style_tags: vec!["casual".into()],
        })
    }

    async fn plan_trip(&self, request: &TripPlanRequest) -> Result<TripPlan, WardrobeError> {
        self.trip_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_trip_request.lock().unwrap() = Some(request.clone());
        if let Some(delay) = self.trip_delay {
            tokio::time::sleep(delay).await;
        }
        self.trip_plan
            .clone()
            .ok_or_else(|| WardrobeError::Ai("no plan scripted".into()))
    }

    async fn generate_try_on(&self, request: &TryOnRequest) -> Result<ImageData, WardrobeError> {
        self.generated.lock().unwrap().push(request.clone());
        if self.fail_generation {
            return Err(WardrobeError::Ai("generation failed".into()));
        }
        let tag = match request.angle {
            Angle::Front => 1,
            Angle::Side => 2,
            Angle::Back => 3,
        };
        Ok(ImageData::new("image/png", vec![tag]))
    }

    async fn critique(
        &self,
        _image: &ImageData,
        _face: Option<&ImageData>,
    ) -> Result<CriticVerdict, WardrobeError> {
        self.critique_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_critique {
            return Err(WardrobeError::Ai("critique failed".into()));
        }
        Ok(CriticVerdict {
            identity_match_score: 88.0,
            realism_score: 91.0,
            style_advice: "Roll the sleeves".into(),
            color_analysis: "Cool tones".into(),
        })
    }
}
