//! ============================================================================
//! Onboarding Quiz
//! ============================================================================
//! Mandatory linear wizard that produces the user profile:
//!
//! ```text
//! Basics ─► BodyShape ─► Style ─► Finishing ─► Done
//! ```
//! Body-shape choices depend on the gender picked in `Basics`. `Finishing`
//! holds for a short synthetic delay before the profile is committed and the
//! rest of the app unlocks.
//! ============================================================================

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::state::{Action, AppState};
use crate::types::{Gender, ImageData, UserProfile, WardrobeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStep {
    Basics,
    BodyShape,
    Style,
    Finishing,
    Done,
}

/// Style tags offered in the multi-select step
pub const STYLE_TAGS: [&str; 10] = [
    "Minimalist",
    "Classic",
    "Streetwear",
    "Bohemian",
    "Business",
    "Athleisure",
    "Vintage",
    "Preppy",
    "Romantic",
    "Avant-garde",
];

const FEMALE_SHAPES: [&str; 5] = ["Hourglass", "Pear", "Apple", "Rectangle", "Inverted Triangle"];
const MALE_SHAPES: [&str; 5] = ["Rectangle", "Triangle", "Inverted Triangle", "Oval", "Trapezoid"];
const NEUTRAL_SHAPES: [&str; 6] = [
    "Rectangle",
    "Hourglass",
    "Triangle",
    "Inverted Triangle",
    "Oval",
    "Pear",
];

/// Body shapes available for a gender
pub fn body_shape_options(gender: Gender) -> &'static [&'static str] {
    match gender {
        Gender::Female => &FEMALE_SHAPES,
        Gender::Male => &MALE_SHAPES,
        Gender::NonBinary => &NEUTRAL_SHAPES,
    }
}

/// Answers to the first step
#[derive(Debug, Clone, PartialEq)]
pub struct Basics {
    pub name: String,
    pub gender: Gender,
    pub height_cm: u32,
    pub weight_kg: u32,
    pub skin_tone: String,
}

#[derive(Debug, Clone)]
pub struct OnboardingQuiz {
    step: QuizStep,
    basics: Option<Basics>,
    body_shape: Option<String>,
    style_tags: Vec<String>,
    personalization_opt_in: bool,
    face_photo: Option<ImageData>,
}

impl Default for OnboardingQuiz {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingQuiz {
    pub fn new() -> Self {
        Self {
            step: QuizStep::Basics,
            basics: None,
            body_shape: None,
            style_tags: Vec::new(),
            personalization_opt_in: false,
            face_photo: None,
        }
    }

    pub fn step(&self) -> QuizStep {
        self.step
    }

    pub fn body_shape(&self) -> Option<&str> {
        self.body_shape.as_deref()
    }

    pub fn style_tags(&self) -> &[String] {
        &self.style_tags
    }

    /// Record the basics. A gender change drops a body shape that is not
    /// offered for the new gender.
    pub fn set_basics(&mut self, basics: Basics) -> Result<(), WardrobeError> {
        if basics.name.trim().is_empty() {
            return Err(WardrobeError::Validation("name is required".into()));
        }
        if basics.height_cm == 0 || basics.weight_kg == 0 {
            return Err(WardrobeError::Validation(
                "height and weight must be positive".into(),
            ));
        }
        if let Some(shape) = &self.body_shape {
            if !body_shape_options(basics.gender).contains(&shape.as_str()) {
                debug!("Clearing body shape {} after gender change", shape);
                self.body_shape = None;
            }
        }
        self.basics = Some(basics);
        Ok(())
    }

    pub fn set_personalization(&mut self, opt_in: bool) {
        self.personalization_opt_in = opt_in;
    }

    pub fn set_face_photo(&mut self, photo: Option<ImageData>) {
        self.face_photo = photo;
    }

    pub fn choose_body_shape(&mut self, shape: &str) -> Result<(), WardrobeError> {
        let gender = self
            .basics
            .as_ref()
            .map(|b| b.gender)
            .ok_or_else(|| WardrobeError::Validation("answer the basics first".into()))?;
        let option = body_shape_options(gender)
            .iter()
            .find(|o| o.eq_ignore_ascii_case(shape.trim()))
            .ok_or_else(|| {
                WardrobeError::Validation(format!(
                    "{} is not a {} body shape",
                    shape,
                    gender.as_str()
                ))
            })?;
        self.body_shape = Some(option.to_string());
        Ok(())
    }

    /// Multi-select toggle. Unknown tags are rejected.
    pub fn toggle_style(&mut self, tag: &str) -> Result<(), WardrobeError> {
        let tag = STYLE_TAGS
            .iter()
            .find(|t| t.eq_ignore_ascii_case(tag.trim()))
            .ok_or_else(|| WardrobeError::Validation(format!("unknown style tag {}", tag)))?;
        if let Some(pos) = self.style_tags.iter().position(|t| t == tag) {
            self.style_tags.remove(pos);
        } else {
            self.style_tags.push(tag.to_string());
        }
        Ok(())
    }

    pub fn can_advance(&self) -> bool {
        match self.step {
            QuizStep::Basics => self.basics.is_some(),
            QuizStep::BodyShape => self.body_shape.is_some(),
            QuizStep::Style => !self.style_tags.is_empty(),
            QuizStep::Finishing | QuizStep::Done => false,
        }
    }

    pub fn next(&mut self) -> Result<QuizStep, WardrobeError> {
        if !self.can_advance() {
            return Err(WardrobeError::Validation(format!(
                "step {:?} is incomplete",
                self.step
            )));
        }
        self.step = match self.step {
            QuizStep::Basics => QuizStep::BodyShape,
            QuizStep::BodyShape => QuizStep::Style,
            QuizStep::Style => QuizStep::Finishing,
            other => other,
        };
        Ok(self.step)
    }

    pub fn back(&mut self) -> QuizStep {
        self.step = match self.step {
            QuizStep::BodyShape => QuizStep::Basics,
            QuizStep::Style => QuizStep::BodyShape,
            other => other,
        };
        self.step
    }

    /// Build the profile, wait out the finishing delay, then commit it.
    /// The app stays locked until this returns.
    pub async fn finish(
        &mut self,
        state: &mut AppState,
        delay: Duration,
    ) -> Result<UserProfile, WardrobeError> {
        if self.step != QuizStep::Finishing {
            return Err(WardrobeError::Validation(
                "the quiz is not ready to finish".into(),
            ));
        }
        let basics = self
            .basics
            .clone()
            .ok_or_else(|| WardrobeError::Validation("basics missing".into()))?;
        let body_shape = self
            .body_shape
            .clone()
            .ok_or_else(|| WardrobeError::Validation("body shape missing".into()))?;

        let profile = UserProfile {
            name: basics.name.trim().to_string(),
            gender: basics.gender,
            height_cm: basics.height_cm,
            weight_kg: basics.weight_kg,
            body_shape,
            skin_tone: basics.skin_tone,
            style_tags: self.style_tags.clone(),
            personalization_opt_in: self.personalization_opt_in,
            face_photo: self.face_photo.clone(),
            onboarding_complete: true,
        };

        tokio::time::sleep(delay).await;
        state.dispatch(Action::SetProfile(profile.clone()))?;
        self.step = QuizStep::Done;
        info!("Profile created for {}", profile.name);
        Ok(profile)
    }
}
