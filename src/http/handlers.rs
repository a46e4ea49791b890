//! Content endpoints.
//!
//! Thin handlers over canned domain data. Their job here is to exercise the
//! request pipeline: they consume the resolved identity, record their
//! persistence operations, and raise `ApiError` values for the normalizer.

use axum::extract::Path;
use axum::{Extension, Json};
use serde::Serialize;

use crate::auth::Identity;
use crate::http::error::{ApiError, ApiResult};
use crate::http::middleware::QueryRecorder;

const ZODIAC_SIGNS: [&str; 12] = [
    "aries",
    "taurus",
    "gemini",
    "cancer",
    "leo",
    "virgo",
    "libra",
    "scorpio",
    "sagittarius",
    "capricorn",
    "aquarius",
    "pisces",
];

const THEMES: [&str; 6] = [
    "A day for bold beginnings; trust the first idea you wake up with.",
    "Slow down and let a conversation you have been avoiding happen.",
    "Money matters come into focus; revisit a plan you shelved.",
    "An old friend resurfaces with news that changes your week.",
    "Creative work flows easily today; protect an hour for it.",
    "Rest is productive too; the stars ask less of you than you think.",
];

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct Horoscope {
    pub sign: String,
    pub summary: &'static str,
    pub lucky_number: u32,
}

pub async fn get_horoscope(
    Path(sign): Path<String>,
    recorder: QueryRecorder,
) -> ApiResult<Json<Horoscope>> {
    let sign = sign.to_lowercase();
    let index = ZODIAC_SIGNS
        .iter()
        .position(|s| *s == sign)
        .ok_or_else(|| ApiError::NotFound(format!("zodiac sign '{}'", sign)))?;

    let horoscope = recorder.observe(
        "SELECT summary, lucky_number FROM daily_horoscopes WHERE sign = $1 AND date = CURRENT_DATE",
        || Horoscope {
            summary: THEMES[index % THEMES.len()],
            lucky_number: (index as u32 * 7) % 9 + 1,
            sign,
        },
    );

    Ok(Json(horoscope))
}

#[derive(Serialize)]
pub struct NumerologyProfile {
    pub life_path: u8,
    pub meaning: &'static str,
}

fn life_path_meaning(number: u8) -> Option<&'static str> {
    match number {
        1 => Some("The leader: independent, driven, original."),
        2 => Some("The diplomat: cooperative, intuitive, patient."),
        3 => Some("The communicator: expressive, social, creative."),
        4 => Some("The builder: practical, disciplined, reliable."),
        5 => Some("The adventurer: adaptable, curious, restless."),
        6 => Some("The caretaker: responsible, protective, warm."),
        7 => Some("The seeker: analytical, introspective, reserved."),
        8 => Some("The executive: ambitious, organized, material."),
        9 => Some("The humanitarian: compassionate, generous, wise."),
        11 => Some("Master intuitive: visionary under pressure."),
        22 => Some("Master builder: large plans made concrete."),
        33 => Some("Master teacher: service at great personal cost."),
        _ => None,
    }
}

pub async fn get_numerology(
    Path(number): Path<String>,
    recorder: QueryRecorder,
) -> ApiResult<Json<NumerologyProfile>> {
    let life_path: u8 = number
        .parse()
        .map_err(|_| ApiError::Validation(format!("'{}' is not a life path number", number)))?;

    let meaning = life_path_meaning(life_path).ok_or_else(|| {
        ApiError::Validation(format!("{} is not a valid life path number", life_path))
    })?;

    recorder.record(
        "SELECT meaning FROM life_paths WHERE number = $1",
        std::time::Duration::ZERO,
    );

    Ok(Json(NumerologyProfile { life_path, meaning }))
}

#[derive(Serialize)]
pub struct ReportStatus {
    pub id: String,
    pub status: &'static str,
    pub download_path: String,
}

pub async fn get_report(
    Path(id): Path<String>,
    recorder: QueryRecorder,
) -> ApiResult<Json<ReportStatus>> {
    let status = recorder.observe(
        "SELECT id, state FROM reports WHERE id = $1",
        || ReportStatus {
            download_path: format!("/api/v1/reports/{}/download", id),
            status: "ready",
            id,
        },
    );
    recorder.record(
        "UPDATE reports SET accessed_at = NOW() WHERE id = $1",
        std::time::Duration::ZERO,
    );

    Ok(Json(status))
}

#[derive(Serialize)]
pub struct CheckoutSession {
    pub session_id: String,
    pub plan: String,
    pub checkout_url: String,
}

pub async fn create_checkout(
    Extension(identity): Extension<Identity>,
    recorder: QueryRecorder,
) -> ApiResult<Json<CheckoutSession>> {
    let principal = identity
        .principal()
        .ok_or_else(|| ApiError::Authentication("API key required for checkout".to_string()))?;

    let session_id = uuid::Uuid::new_v4().to_string();
    recorder.record(
        "INSERT INTO checkout_sessions (id, principal_id) VALUES ($1, $2)",
        std::time::Duration::ZERO,
    );

    Ok(Json(CheckoutSession {
        checkout_url: format!("https://checkout.stripe.com/c/pay/{}", session_id),
        plan: principal.plan.clone(),
        session_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_life_path_meanings() {
        for n in 1..=9 {
            assert!(life_path_meaning(n).is_some());
        }
        for n in [11, 22, 33] {
            assert!(life_path_meaning(n).is_some());
        }
        for n in [0, 10, 12, 34, 255] {
            assert!(life_path_meaning(n).is_none());
        }
    }

    #[test]
    fn test_zodiac_list_is_complete() {
        assert_eq!(ZODIAC_SIGNS.len(), 12);
        assert!(ZODIAC_SIGNS.contains(&"leo"));
    }
}
