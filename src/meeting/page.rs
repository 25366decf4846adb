use axum::{debug_handler, extract::{Path, Query}, response::{Html, IntoResponse, Redirect, Response}};
use serde::Deserialize;

use crate::{include_res, res::escape};

use super::lifecycle::{join_url, DASHBOARD};

#[derive(Deserialize)]
pub(crate) struct MeetingQuery {
    url: Option<String>,
}

/// The in-call view. The call object itself runs in the browser; this only
/// decides whether there is anything to join.
#[debug_handler]
pub(crate) async fn meeting(
    Path(room_name): Path<String>,
    Query(MeetingQuery { url }): Query<MeetingQuery>,
) -> Response {
    let Some(url) = join_url(url.as_deref()) else {
        return Redirect::to(DASHBOARD).into_response();
    };

    Html(
        include_res!(str, "/pages/meeting.html")
            .replace("{room_name}", &escape(&room_name))
            .replace("{room_url}", &escape(url))
    ).into_response()
}
