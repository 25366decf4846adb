use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;

use crate::{
    baas::Baas,
    include_res,
    models::{Meeting, NewMeeting, Profile},
    res::{self, escape},
    rooms::{self, JoinTarget},
    session::AuthSession,
    AppResult, Config,
};

const START_FAILED: &str = "Failed to start meeting. Please check your API keys.";

#[derive(Deserialize)]
pub(crate) struct JoinForm {
    link: String,
}

fn sign_in_first() -> Response {
    Redirect::to("/signin?return_url=/dashboard").into_response()
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn dashboard(
    State(baas): State<Baas>,
    auth: AuthSession,
) -> AppResult<Response> {
    let Some((token, user)) = auth.current_user(&baas).await? else {
        return Ok(sign_in_first());
    };

    let (profile, profile_missing) = match baas.profile(&token, user.id).await {
        Ok(profile) => (profile, false),
        Err(err) => {
            tracing::warn!(user_id = %user.id, error = %err, "profile fetch failed, using fallback");
            (Profile::fallback(&user), true)
        }
    };

    let meetings = baas.recent_meetings(&token, user.id).await.unwrap_or_else(|err| {
        tracing::warn!(user_id = %user.id, error = %err, "meetings fetch failed");
        Vec::new()
    });

    let warning = if profile_missing {
        include_res!(str, "/pages/dashboard_warning.html")
    } else {
        ""
    };

    let body = include_res!(str, "/pages/dashboard.html")
        .replace("{warning}", warning)
        .replace("{meetings}", &meeting_rows(&meetings))
        .replace("{name}", &escape(&profile.display_name(&user)));

    let flash = auth.take_flash().await?;
    Ok(res::page("Dashboard", true, flash.as_deref(), &body).into_response())
}

fn meeting_rows(meetings: &[Meeting]) -> String {
    if meetings.is_empty() {
        return include_res!(str, "/pages/no_meetings.html").to_owned();
    }

    let rows: String = meetings
        .iter()
        .map(|meeting| {
            let date = meeting
                .started_at
                .map(|at| format!("{}-{:02}-{:02}", at.year(), u8::from(at.month()), at.day()))
                .unwrap_or_default();
            include_res!(str, "/pages/meeting_row.html")
                .replace("{date}", &date)
                .replace("{participants}", &meeting.participants().to_string())
                .replace("{room_name}", &escape(&meeting.room_name))
        })
        .collect();

    include_res!(str, "/pages/meeting_table.html").replace("{rows}", &rows)
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn start_meeting(
    State(baas): State<Baas>,
    State(http): State<reqwest::Client>,
    State(config): State<Config>,
    auth: AuthSession,
) -> AppResult<Response> {
    let Some((token, user)) = auth.current_user(&baas).await? else {
        return Ok(sign_in_first());
    };

    let room = match rooms::create_room(&http, &config.provider).await.map(|room| room.descriptor()) {
        Ok(Ok(room)) => room,
        Ok(Err(err)) => {
            tracing::error!(error = %err, "room descriptor missing name or url");
            auth.flash(START_FAILED).await?;
            return Ok(Redirect::to("/dashboard").into_response());
        }
        Err(err) => {
            tracing::error!(error = %err, body = %err.body(), "failed to start meeting");
            auth.flash(START_FAILED).await?;
            return Ok(Redirect::to("/dashboard").into_response());
        }
    };

    let record = NewMeeting { room_name: &room.name, host_id: user.id };
    if let Err(err) = baas.record_meeting(&token, &record).await {
        tracing::warn!(room = %room.name, error = %err, "could not record meeting");
    }

    Ok(Redirect::to(&rooms::meeting_path(&room.name, &room.url)).into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn join_meeting(
    State(config): State<Config>,
    auth: AuthSession,
    Form(JoinForm { link }): Form<JoinForm>,
) -> AppResult<Response> {
    match JoinTarget::parse(&link, config.provider.domain.as_deref()) {
        Ok(target) => Ok(Redirect::to(&target.meeting_path()).into_response()),
        Err(err) => {
            auth.flash(err.to_string()).await?;
            Ok(Redirect::to("/dashboard").into_response())
        }
    }
}
