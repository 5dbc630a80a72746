//! UseCase layer: one use case per client-visible operation.

mod broadcast;
pub mod connect_connection;
pub mod disconnect_connection;
pub mod error;
pub mod get_room_detail;
pub mod get_rooms;
pub mod join_room;
pub mod leave_room;

pub use connect_connection::ConnectConnectionUseCase;
pub use disconnect_connection::DisconnectConnectionUseCase;
pub use error::GetRoomDetailError;
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
