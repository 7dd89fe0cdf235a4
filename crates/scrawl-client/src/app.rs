//! The whiteboard engine: gesture in, pixels out, messages both ways.

use scrawl_core::{
    Board, Brush, ClientMessage, ConnectionState, InputCapture, PointerEvent, SyncEvent,
};
use scrawl_raster::Surface;

/// One client's whiteboard.
///
/// Everything here runs on the caller's thread; inbound channel traffic is
/// applied via [`Whiteboard::apply`] and outbound messages are queued until
/// drained with [`Whiteboard::take_outgoing`] (so the engine never touches
/// the socket itself).
pub struct Whiteboard {
    capture: InputCapture,
    brush: Brush,
    /// Local mirror of the server's ordered board state.
    board: Board,
    surface: Surface,
    outgoing: Vec<ClientMessage>,
    connection: ConnectionState,
    user_count: usize,
}

impl Whiteboard {
    /// Create a whiteboard with a blank surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            capture: InputCapture::new(),
            brush: Brush::default(),
            board: Board::new(),
            surface: Surface::new(width, height),
            outgoing: Vec::new(),
            connection: ConnectionState::Disconnected,
            user_count: 0,
        }
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    /// Change the active brush; affects segments emitted from now on.
    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Connected client count as last reported by the server.
    pub fn user_count(&self) -> usize {
        self.user_count
    }

    pub fn is_drawing(&self) -> bool {
        self.capture.is_drawing()
    }

    /// Feed a local pointer event. A segment emitted by the gesture is drawn
    /// immediately, mirrored, and queued for the server.
    pub fn pointer_event(&mut self, event: PointerEvent) {
        if let Some(segment) = self.capture.handle_event(event, &self.brush) {
            self.surface.stroke_segment(&segment);
            self.board.push(segment.clone());
            self.outgoing.push(ClientMessage::Draw { segment });
        }
    }

    /// Ask the server to blank the board. The local canvas clears when the
    /// server fans the clear back out, sender included.
    pub fn request_clear(&mut self) {
        self.outgoing.push(ClientMessage::Clear);
    }

    /// Apply one inbound sync event.
    pub fn apply(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Draw(segment) => {
                self.surface.stroke_segment(&segment);
                self.board.push(segment);
            }
            SyncEvent::Clear => {
                self.board.clear();
                self.surface.clear();
            }
            SyncEvent::BoardState(segments) => {
                self.surface.replay(&segments);
                self.board.replace(segments);
            }
            SyncEvent::CurrentUsers(count) => {
                self.user_count = count;
            }
            SyncEvent::Connected => {
                self.connection = ConnectionState::Connected;
            }
            SyncEvent::Disconnected => {
                self.connection = ConnectionState::Disconnected;
                self.user_count = 0;
            }
            SyncEvent::Error(message) => {
                log::warn!("Sync channel error: {}", message);
                self.connection = ConnectionState::Error;
            }
        }
    }

    /// Resize the surface and redraw the mirrored board onto it.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
        self.surface.replay(self.board.segments());
    }

    /// Drain queued outbound messages for the sync channel.
    pub fn take_outgoing(&mut self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.outgoing)
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }
}
