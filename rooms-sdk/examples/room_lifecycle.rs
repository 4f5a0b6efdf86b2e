//! Walks a room through its lifecycle against a running rooms service.
//!
//! Start the service first (`cargo run -p rooms-service`), then:
//!
//! ```text
//! ROOMS_CONNECTION_STRING="endpoint=http://localhost:8080;accesskey=dev" \
//!     cargo run -p rooms-sdk --example room_lifecycle
//! ```

use chrono::{Duration, Utc};
use rooms_sdk::{
    CancellationToken, CommunicationIdentifier, CreateRoomOptions, ParticipantRole, Result, RoomParticipant,
    RoomsClient, UpdateRoomOptions,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let connection_string = std::env::var("ROOMS_CONNECTION_STRING")
        .unwrap_or_else(|_| "endpoint=http://localhost:8080;accesskey=dev".to_string());
    let client = RoomsClient::from_connection_string(&connection_string)?;

    // Ctrl-C aborts whatever request is in flight
    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let valid_from = Utc::now();
    let room = client
        .create_room(
            CreateRoomOptions::new()
                .valid_from(valid_from)
                .valid_until(valid_from + Duration::days(7))
                .participants(vec![
                    RoomParticipant::new("8:acs:alice").with_role(ParticipantRole::Presenter),
                    RoomParticipant::new("8:acs:bob"),
                ]),
            &token,
        )
        .await?
        .into_value();
    info!("Created room {} valid until {}", room.id, room.valid_until);

    client
        .add_participants(
            &room.id,
            vec![RoomParticipant::new("8:acs:carol").with_role(ParticipantRole::Consumer)],
            &token,
        )
        .await?;
    client
        .remove_participants(&room.id, vec![CommunicationIdentifier::new("8:acs:bob")], &token)
        .await?;

    let participants = client.get_participants(&room.id, &token).await?.into_value();
    for participant in &participants.participants {
        info!(
            "{} -> {}",
            participant.communication_identifier,
            participant.role.as_ref().map(|r| r.as_str()).unwrap_or("unset")
        );
    }

    let room = client
        .update_room(
            &room.id,
            UpdateRoomOptions::new().valid_until(valid_from + Duration::days(14)),
            &token,
        )
        .await?
        .into_value();
    info!("Extended room {} to {}", room.id, room.valid_until);

    client.delete_room(&room.id, &token).await?;
    info!("Deleted room {}", room.id);

    Ok(())
}
