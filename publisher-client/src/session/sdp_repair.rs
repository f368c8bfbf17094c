use crate::error::MediaError;
use publisher_core::SessionDescription;
use std::io::Cursor;
use tracing::{debug, warn};
use webrtc::sdp::description::common::Attribute;
use webrtc::sdp::description::session::SessionDescription as SdpMessage;

pub const SETUP_ATTRIBUTE: &str = "setup";
pub const VALID_SETUP_ROLES: [&str; 3] = ["actpass", "active", "passive"];
pub const FALLBACK_SETUP_ROLE: &str = "active";

/// Media sections a publishing answer is expected to carry (video, audio).
pub const EXPECTED_MEDIA_SECTIONS: usize = 2;

pub fn parse_sdp(text: &str) -> Result<SdpMessage, MediaError> {
    let mut reader = Cursor::new(text.as_bytes());
    SdpMessage::unmarshal(&mut reader).map_err(|e| MediaError::Sdp(e.to_string()))
}

/// Gives every media section a usable DTLS `setup` role.
///
/// Some servers send answers without `a=setup` or with a role outside
/// `actpass|active|passive`; those sections get `active`. Returns how many
/// sections were changed.
pub fn repair_setup_roles(sdp: &mut SdpMessage) -> usize {
    let mut repaired = 0;

    for (index, media) in sdp.media_descriptions.iter_mut().enumerate() {
        let setup = media
            .attributes
            .iter_mut()
            .find(|a| a.key == SETUP_ATTRIBUTE);

        match setup {
            Some(attr) if is_valid_role(attr.value.as_deref()) => {}
            Some(attr) => {
                debug!(
                    "Media {}: replacing setup {:?} with {}",
                    index, attr.value, FALLBACK_SETUP_ROLE
                );
                attr.value = Some(FALLBACK_SETUP_ROLE.to_owned());
                repaired += 1;
            }
            None => {
                debug!("Media {}: adding missing setup {}", index, FALLBACK_SETUP_ROLE);
                media.attributes.push(Attribute {
                    key: SETUP_ATTRIBUTE.to_owned(),
                    value: Some(FALLBACK_SETUP_ROLE.to_owned()),
                });
                repaired += 1;
            }
        }
    }

    repaired
}

fn is_valid_role(role: Option<&str>) -> bool {
    role.is_some_and(|r| VALID_SETUP_ROLES.contains(&r))
}

/// Parses the server's answer, repairs it and wraps it as a remote answer.
pub fn repair_answer(text: &str) -> Result<SessionDescription, MediaError> {
    let mut sdp = parse_sdp(text)?;

    let sections = sdp.media_descriptions.len();
    if sections != EXPECTED_MEDIA_SECTIONS {
        warn!(
            "Answer has {} media sections, expected {}",
            sections, EXPECTED_MEDIA_SECTIONS
        );
    }

    if repair_setup_roles(&mut sdp) > 0 {
        warn!("Answer had missing or invalid setup attributes, repaired");
    }

    Ok(SessionDescription::answer(sdp.marshal()))
}
