//! Blocking facade over [`RoomsClient`].
//!
//! Each call drives the async client to completion on a runtime owned by the
//! facade, so the blocking and async surfaces share one implementation.
//! Calling these methods from inside an async runtime panics.

use tokio::runtime::{Builder, Runtime};
use tokio_util::sync::CancellationToken;

use crate::{
    client::RoomsClient,
    errors::{Result, RoomsError},
    models::*,
    transport::{HttpTransport, ReqwestTransport},
};

#[derive(Debug)]
pub struct BlockingRoomsClient<T = ReqwestTransport> {
    inner: RoomsClient<T>,
    runtime: Runtime,
}

impl BlockingRoomsClient<ReqwestTransport> {
    pub fn new(options: RoomsClientOptions) -> Result<Self> {
        let runtime = build_runtime()?;
        let inner = {
            let _guard = runtime.enter();
            RoomsClient::new(options)?
        };
        Ok(Self { inner, runtime })
    }
}

impl<T: HttpTransport> BlockingRoomsClient<T> {
    pub fn with_transport(options: RoomsClientOptions, transport: T) -> Result<Self> {
        Ok(Self {
            inner: RoomsClient::with_transport(options, transport)?,
            runtime: build_runtime()?,
        })
    }

    /// The async client backing this facade
    pub fn async_client(&self) -> &RoomsClient<T> {
        &self.inner
    }

    pub fn create_room(&self, options: CreateRoomOptions, cancellation: &CancellationToken) -> Result<Response<Room>> {
        self.runtime.block_on(self.inner.create_room(options, cancellation))
    }

    pub fn get_room(&self, room_id: &str, cancellation: &CancellationToken) -> Result<Response<Room>> {
        self.runtime.block_on(self.inner.get_room(room_id, cancellation))
    }

    pub fn update_room(
        &self,
        room_id: &str,
        options: UpdateRoomOptions,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>> {
        self.runtime
            .block_on(self.inner.update_room(room_id, options, cancellation))
    }

    pub fn delete_room(&self, room_id: &str, cancellation: &CancellationToken) -> Result<Response<()>> {
        self.runtime.block_on(self.inner.delete_room(room_id, cancellation))
    }

    pub fn add_participants(
        &self,
        room_id: &str,
        participants: Vec<RoomParticipant>,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>> {
        self.runtime
            .block_on(self.inner.add_participants(room_id, participants, cancellation))
    }

    pub fn update_participants(
        &self,
        room_id: &str,
        participants: Vec<RoomParticipant>,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>> {
        self.runtime
            .block_on(self.inner.update_participants(room_id, participants, cancellation))
    }

    pub fn remove_participants(
        &self,
        room_id: &str,
        identifiers: Vec<CommunicationIdentifier>,
        cancellation: &CancellationToken,
    ) -> Result<Response<Room>> {
        self.runtime
            .block_on(self.inner.remove_participants(room_id, identifiers, cancellation))
    }

    pub fn get_participants(
        &self,
        room_id: &str,
        cancellation: &CancellationToken,
    ) -> Result<Response<ParticipantsCollection>> {
        self.runtime.block_on(self.inner.get_participants(room_id, cancellation))
    }
}

fn build_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| RoomsError::ConfigurationError(format!("Failed to start runtime: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpResponse, MockHttpTransport};
    use assert_matches::assert_matches;
    use reqwest::Method;

    fn options() -> RoomsClientOptions {
        RoomsClientOptions::new("http://localhost:8080")
    }

    #[test]
    fn blocking_calls_return_the_async_result() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_execute()
            .withf(|req| req.method == Method::GET)
            .times(1)
            .returning(|_| {
                Ok(HttpResponse::new(
                    200,
                    r#"{"participants":[{"communicationIdentifier":{"rawId":"8:acs:user1"},"role":"Presenter"}]}"#,
                ))
            });

        let client = BlockingRoomsClient::with_transport(options(), transport).unwrap();
        let collection = client
            .get_participants("room-1", &CancellationToken::new())
            .unwrap()
            .into_value();
        assert_eq!(collection.participants.len(), 1);
    }

    #[test]
    fn blocking_delete_surfaces_not_found() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_execute()
            .withf(|req| req.method == Method::DELETE)
            .returning(|_| Ok(HttpResponse::new(404, "")));

        let client = BlockingRoomsClient::with_transport(options(), transport).unwrap();
        let err = client
            .delete_room("room-1", &CancellationToken::new())
            .unwrap_err();
        assert_matches!(err, RoomsError::NotFound { message } if message == "HTTP 404");
    }

    #[test]
    fn blocking_validation_matches_async() {
        let mut transport = MockHttpTransport::new();
        transport.expect_execute().never();

        let client = BlockingRoomsClient::with_transport(options(), transport).unwrap();
        let err = client
            .update_room("", UpdateRoomOptions::new(), &CancellationToken::new())
            .unwrap_err();
        assert_matches!(err, RoomsError::InvalidArgument(_));
    }
}
