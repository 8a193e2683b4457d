//! Prompt templates and response schemas for the stylist model.

use serde_json::{json, Value};

use super::{TripPlanRequest, TryOnRequest};
use crate::types::Angle;

pub const CLASSIFY_PROMPT: &str = "Analyze this clothing item. Identify its category \
(Top, Bottom, Outerwear, Shoes, Accessory or Other), a specific sub-category, the primary \
color, the season it suits best (Spring, Summer, Fall, Winter or All Season) and up to five \
short style tags. Respond with JSON only.";

pub const CRITIQUE_PROMPT: &str = "You are a fashion critic reviewing a virtual try-on image. \
If a reference face photo is provided, score from 0 to 100 how well the generated person \
matches that identity. Score from 0 to 100 how photorealistic the image is. Give one \
paragraph of style advice and one paragraph analysing the color combination. Respond with \
JSON only.";

pub fn classify_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "category": { "type": "STRING" },
            "subCategory": { "type": "STRING" },
            "primaryColor": { "type": "STRING" },
            "season": { "type": "STRING" },
            "styleTags": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["category", "subCategory", "primaryColor", "season", "styleTags"]
    })
}

pub fn trip_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "weatherSummary": { "type": "STRING" },
            "dailyPlan": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "day": { "type": "INTEGER" },
                        "date": { "type": "STRING" },
                        "eventDescription": { "type": "STRING" },
                        "weatherForecast": { "type": "STRING" },
                        "outfit": {
                            "type": "OBJECT",
                            "properties": {
                                "topId": { "type": "STRING" },
                                "bottomId": { "type": "STRING" },
                                "shoeId": { "type": "STRING" },
                                "outerwearId": { "type": "STRING" },
                                "notes": { "type": "STRING" }
                            },
                            "required": ["notes"]
                        }
                    },
                    "required": ["day", "date", "eventDescription", "weatherForecast", "outfit"]
                }
            },
            "packingList": {
                "type": "OBJECT",
                "properties": {
                    "clothes": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "toiletries": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "misc": { "type": "ARRAY", "items": { "type": "STRING" } }
                },
                "required": ["clothes", "toiletries", "misc"]
            }
        },
        "required": ["weatherSummary", "dailyPlan", "packingList"]
    })
}

pub fn critique_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "identityMatchScore": { "type": "NUMBER" },
            "realismScore": { "type": "NUMBER" },
            "styleAdvice": { "type": "STRING" },
            "colorAnalysis": { "type": "STRING" }
        },
        "required": ["identityMatchScore", "realismScore", "styleAdvice", "colorAnalysis"]
    })
}

/// Trip planning prompt. The inventory is embedded as JSON lines so the model
/// can cite item ids verbatim.
pub fn trip_prompt(request: &TripPlanRequest) -> String {
    let inventory = request
        .inventory
        .iter()
        .map(|entry| serde_json::to_string(entry).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n");

    let closet_rule = if request.preferences.strict_closet_only {
        "Only use items from the inventory below. Reference them by their exact id."
    } else {
        "Prefer items from the inventory below, referenced by exact id. If nothing suitable \
         exists for a slot, omit the id and describe what to buy in the notes."
    };
    let repeat_rule = if request.preferences.allow_repeats {
        "Items may be worn on more than one day."
    } else {
        "Avoid repeating the same item on different days."
    };

    let mut prompt = format!(
        "You are a travel stylist. Plan outfits for a trip to {} from {} to {}.\n\
         Events and notes: {}\n\
         Estimate the typical weather for the destination and dates.\n\
         {}\n{}\n\
         Produce one daily entry per day with the event, a short weather forecast, the chosen \
         top, bottom, shoe and outerwear ids, and styling notes. Also produce a packing list \
         split into clothes, toiletries and misc.\n\n\
         Inventory:\n{}\n",
        request.destination,
        request.start_date,
        request.end_date,
        if request.event_description.trim().is_empty() {
            "none given"
        } else {
            request.event_description.as_str()
        },
        closet_rule,
        repeat_rule,
        inventory
    );

    if let Some(profile) = &request.profile_summary {
        prompt.push_str(&format!("\nTraveller profile: {}\n", profile));
    }
    prompt
}

/// Natural-language instruction for a try-on image at the requested angle
pub fn try_on_prompt(request: &TryOnRequest) -> String {
    let garments = request
        .garments
        .iter()
        .map(|g| g.label.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let view = match request.angle {
        Angle::Front => "a full-body front view",
        Angle::Side => "a full-body side profile view",
        Angle::Back => "a full-body view from behind",
    };

    let mut prompt = format!(
        "Generate a photorealistic fashion photo showing {} of the person described below, \
         wearing exactly these garments from the attached images: {}. \
         Person: {} Neutral studio background, natural lighting.",
        view, garments, request.profile_summary
    );
    if request.face.is_some() {
        prompt.push_str(" The first attached image is the person's face; preserve their identity.");
    }
    if request.reference.is_some() {
        prompt.push_str(
            " The last attached image is the front view already generated; keep the same person, \
             garments and lighting.",
        );
    }
    prompt
}
