// Notifications for the embedding page. The core never calls user code directly: events are
// queued in `State` and drained by the embedder after the core is done mutating state.

use serde::{Deserialize, Serialize};

use crate::piece::Piece;
use crate::shape::DrawShape;
use crate::square::Square;


#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveMetadata {
    pub premade: bool,
    pub captured: Option<Piece>,
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropMetadata {
    pub premade: bool,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BoardEvent {
    // Any change of pieces or hands.
    Change,
    Move { orig: Square, dest: Square, promotion: bool, captured: Option<Piece> },
    Drop { piece: Piece, dest: Square, promotion: bool },
    Select { square: Square },
    PieceSelect { piece: Piece },
    Unselect { square: Square },
    PieceUnselect { piece: Piece },
    // A user move or drop was played (as opposed to set through the API).
    AfterMove { orig: Square, dest: Square, promotion: bool, metadata: MoveMetadata },
    AfterDrop { piece: Piece, dest: Square, promotion: bool, metadata: DropMetadata },
    PremoveSet { orig: Square, dest: Square, promotion: bool },
    PremoveUnset,
    PredropSet { piece: Piece, dest: Square, promotion: bool },
    PredropUnset,
    PromotionInitiated,
    PromotionAfter { piece: Piece, promoted: bool },
    PromotionCancel,
    DrawChange { shapes: Vec<DrawShape> },
}
