use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

/// Characters that can't appear raw in a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ').add(b'"').add(b'#').add(b'%').add(b'/').add(b'<').add(b'>')
    .add(b'?').add(b'`').add(b'{').add(b'}').add(b'\\').add(b'+');

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    #[error("Enter a meeting link or room name to join.")]
    Empty,
    #[error("\"{0}\" is a room name, paste the full meeting link instead.")]
    NeedsFullLink(String),
    #[error("\"{0}\" is not a meeting link.")]
    InvalidLink(String),
}

/// Where the meeting page should point the call object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTarget {
    pub room_name: String,
    pub url: Url,
}

impl JoinTarget {
    /// Accepts either a full room link or a bare room name.
    ///
    /// A bare name only becomes a link when the provider domain is configured;
    /// guessing a subdomain would send people to someone else's tenant.
    pub fn parse(input: &str, domain: Option<&str>) -> Result<JoinTarget, JoinError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(JoinError::Empty);
        }

        if input.contains('/') {
            let url = Url::parse(input).map_err(|_| JoinError::InvalidLink(input.to_owned()))?;
            let room_name = url
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
                .and_then(|segment| percent_decode_str(segment).decode_utf8().ok())
                .ok_or_else(|| JoinError::InvalidLink(input.to_owned()))?
                .into_owned();
            return Ok(JoinTarget { room_name, url });
        }

        let Some(domain) = domain else {
            return Err(JoinError::NeedsFullLink(input.to_owned()));
        };

        let url = Url::parse(&format!("https://{domain}.daily.co/{input}"))
            .map_err(|_| JoinError::InvalidLink(input.to_owned()))?;
        Ok(JoinTarget { room_name: input.to_owned(), url })
    }

    /// Path of the meeting page for this target.
    pub fn meeting_path(&self) -> String {
        meeting_path(&self.room_name, self.url.as_str())
    }
}

/// `room_name` is the decoded name; it is encoded once here as a path segment.
pub fn meeting_path(room_name: &str, url: &str) -> String {
    let room = utf8_percent_encode(room_name, PATH_SEGMENT);
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("url", url)
        .finish();
    format!("/meeting/{room}?{query}")
}
