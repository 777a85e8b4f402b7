use arrayvec::ArrayVec;
use log::error;

use crate::bitboard::file_of;
use crate::board::{Board, Color, PieceType, CASTLING_RIGHTS_MASK, CASTLING_ROOK_FROM, CASTLING_ROOK_TO};
use crate::zobrist::ZOBRIST;

/// Fixed-capacity move storage; no position has more than 218 legal moves.
pub type MoveList = ArrayVec<Move, 256>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum MoveKind {
    Normal = 0,
    Promotion = 1,
    EnPassant = 2,
    Castling = 3,
}

/// from: 6 bits, to: 6 bits, kind: 2 bits, promotion piece: 2 bits.
/// The all-zero encoding doubles as the null move.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub data: u16,
}

impl Move {
    pub const NULL: Move = Move { data: 0 };

    #[inline]
    pub fn new(from: u8, to: u8, kind: MoveKind, promotion: PieceType) -> Move {
        Move {
            data: from as u16
                | ((to as u16) << 6)
                | ((kind as u16) << 12)
                | (((promotion as u16).wrapping_sub(PieceType::Knight as u16) & 3) << 14),
        }
    }

    #[inline]
    pub fn normal(from: u8, to: u8) -> Move {
        Move::new(from, to, MoveKind::Normal, PieceType::Knight)
    }

    #[inline]
    pub fn from(&self) -> u8 {
        (self.data & 0x3F) as u8
    }

    #[inline]
    pub fn to(&self) -> u8 {
        ((self.data >> 6) & 0x3F) as u8
    }

    #[inline]
    pub fn kind(&self) -> MoveKind {
        match (self.data >> 12) & 3 {
            0 => MoveKind::Normal,
            1 => MoveKind::Promotion,
            2 => MoveKind::EnPassant,
            _ => MoveKind::Castling,
        }
    }

    #[inline]
    pub fn promotion(&self) -> PieceType {
        PieceType::from_index(((self.data >> 14) & 3) as u8 + PieceType::Knight as u8)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.data == 0
    }

    pub fn to_uci(&self) -> String {
        if self.is_null() {
            return String::from("0000");
        }
        let mut result = format!("{}{}", square_name(self.from()), square_name(self.to()));
        if self.kind() == MoveKind::Promotion {
            result.push(self.promotion().to_char(Color::Black));
        }
        result
    }
}

impl std::fmt::Debug for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Move({}, {:?})", self.to_uci(), self.kind())
    }
}

pub fn square_name(square_index: u8) -> String {
    format!(
        "{}{}",
        (b'a' + (square_index & 7)) as char,
        (b'1' + (square_index >> 3)) as char
    )
}

pub fn parse_square(s: &str) -> Option<u8> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0].checked_sub(b'a')?;
    let rank = bytes[1].checked_sub(b'1')?;
    if file > 7 || rank > 7 {
        return None;
    }
    Some(rank * 8 + file)
}

/// Everything needed to reverse one make_move. The invalid sentinel marks a
/// rejected malformed move; unmaking it only pops the history entry.
#[derive(Clone, Copy)]
pub struct UndoInfo {
    castling_rights: u8,
    ep_square: Option<u8>,
    halfmove_clock: u8,
    captured: PieceType,
    invalid: bool,
}

impl UndoInfo {
    fn invalid() -> UndoInfo {
        UndoInfo {
            castling_rights: 0,
            ep_square: None,
            halfmove_clock: 0,
            captured: PieceType::None,
            invalid: true,
        }
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }
}

pub struct NullUndo {
    ep_square: Option<u8>,
    halfmove_clock: u8,
    castling_rights: u8,
}

impl Board {
    pub fn make_move(&mut self, m: Move) -> UndoInfo {
        let keys = &*ZOBRIST;

        // Pre-move hash goes to the history; unmake restores it from there
        self.history.push(self.hash);

        let us = self.side_to_move;
        let them = !us;
        let from = m.from();
        let to = m.to();
        let kind = m.kind();

        let mut moving = self.piece_at(from);
        if moving == PieceType::None {
            // Repair any mailbox/bitboard divergence and retry once
            self.rebuild_mailbox_and_hash();
            if let Some(last) = self.history.last_mut() {
                *last = self.hash;
            }
            moving = self.piece_at(from);
        }
        if moving == PieceType::None {
            error!("make_move {} from an empty square in {:?}", m.to_uci(), self);
            return UndoInfo::invalid();
        }

        let captured = if self.is_empty(to) { PieceType::None } else { self.piece_at(to) };

        let undo = UndoInfo {
            castling_rights: self.castling_rights,
            ep_square: self.ep_square,
            halfmove_clock: self.halfmove_clock,
            captured,
            invalid: false,
        };

        self.hash ^= keys.castling[self.castling_rights as usize];
        if let Some(ep) = self.ep_square {
            self.hash ^= keys.ep_file[file_of(ep) as usize];
        }

        self.halfmove_clock = if moving == PieceType::Pawn || captured != PieceType::None {
            0
        } else {
            self.halfmove_clock + 1
        };
        self.ep_square = None;

        if kind == MoveKind::Castling {
            let side = if file_of(to) == 6 { 0 } else { 1 };
            let idx = us as usize * 2 + side;
            let rook_from = CASTLING_ROOK_FROM[idx];
            let rook_to = CASTLING_ROOK_TO[idx];

            self.hash ^= keys.piece[us as usize][PieceType::King as usize][from as usize];
            self.hash ^= keys.piece[us as usize][PieceType::King as usize][to as usize];
            self.hash ^= keys.piece[us as usize][PieceType::Rook as usize][rook_from as usize];
            self.hash ^= keys.piece[us as usize][PieceType::Rook as usize][rook_to as usize];

            self.move_piece(us, PieceType::King, from, to);
            self.move_piece(us, PieceType::Rook, rook_from, rook_to);
        } else {
            if captured != PieceType::None {
                self.hash ^= keys.piece[them as usize][captured as usize][to as usize];
                self.remove_piece(them, captured, to);
            }

            if kind == MoveKind::EnPassant {
                let cap_sq = if us == Color::White { to - 8 } else { to + 8 };
                self.hash ^= keys.piece[them as usize][PieceType::Pawn as usize][cap_sq as usize];
                self.remove_piece(them, PieceType::Pawn, cap_sq);
            }

            if kind == MoveKind::Promotion {
                self.hash ^= keys.piece[us as usize][PieceType::Pawn as usize][from as usize];
                self.hash ^= keys.piece[us as usize][m.promotion() as usize][to as usize];
                self.remove_piece(us, PieceType::Pawn, from);
                self.put_piece(us, m.promotion(), to);
            } else {
                self.hash ^= keys.piece[us as usize][moving as usize][from as usize];
                self.hash ^= keys.piece[us as usize][moving as usize][to as usize];
                self.move_piece(us, moving, from, to);

                if moving == PieceType::Pawn && to.abs_diff(from) == 16 {
                    self.ep_square = Some((from + to) / 2);
                }
            }
        }

        self.castling_rights &= CASTLING_RIGHTS_MASK[from as usize] & CASTLING_RIGHTS_MASK[to as usize];

        self.hash ^= keys.castling[self.castling_rights as usize];
        if let Some(ep) = self.ep_square {
            self.hash ^= keys.ep_file[file_of(ep) as usize];
        }

        self.hash ^= keys.side_to_move;
        self.side_to_move = them;
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        undo
    }

    pub fn unmake_move(&mut self, m: Move, undo: UndoInfo) {
        if undo.invalid {
            self.history.pop();
            return;
        }

        // Exact pre-move hash, not a recomputation
        self.hash = self.history.pop().unwrap();

        self.side_to_move = !self.side_to_move;
        let us = self.side_to_move;
        let them = !us;
        let from = m.from();
        let to = m.to();
        let kind = m.kind();

        if us == Color::Black {
            self.fullmove_number -= 1;
        }
        self.castling_rights = undo.castling_rights;
        self.ep_square = undo.ep_square;
        self.halfmove_clock = undo.halfmove_clock;

        if kind == MoveKind::Castling {
            let side = if file_of(to) == 6 { 0 } else { 1 };
            let idx = us as usize * 2 + side;
            self.move_piece(us, PieceType::King, to, from);
            self.move_piece(us, PieceType::Rook, CASTLING_ROOK_TO[idx], CASTLING_ROOK_FROM[idx]);
        } else {
            if kind == MoveKind::Promotion {
                self.remove_piece(us, m.promotion(), to);
                self.put_piece(us, PieceType::Pawn, from);
            } else {
                let moving = self.piece_at(to);
                self.move_piece(us, moving, to, from);
            }

            if kind == MoveKind::EnPassant {
                let cap_sq = if us == Color::White { to - 8 } else { to + 8 };
                self.put_piece(them, PieceType::Pawn, cap_sq);
            } else if undo.captured != PieceType::None {
                self.put_piece(them, undo.captured, to);
            }
        }
    }

    /// Null move for search pruning only; must not be played while in check.
    pub fn make_null_move(&mut self) -> NullUndo {
        let keys = &*ZOBRIST;
        let undo = NullUndo {
            ep_square: self.ep_square,
            halfmove_clock: self.halfmove_clock,
            castling_rights: self.castling_rights,
        };

        if let Some(ep) = self.ep_square {
            self.hash ^= keys.ep_file[file_of(ep) as usize];
        }
        self.hash ^= keys.side_to_move;

        self.ep_square = None;
        self.halfmove_clock = 0;
        self.side_to_move = !self.side_to_move;

        undo
    }

    pub fn unmake_null_move(&mut self, undo: NullUndo) {
        let keys = &*ZOBRIST;

        self.hash ^= keys.side_to_move;
        if let Some(ep) = undo.ep_square {
            self.hash ^= keys.ep_file[file_of(ep) as usize];
        }

        self.side_to_move = !self.side_to_move;
        self.ep_square = undo.ep_square;
        self.halfmove_clock = undo.halfmove_clock;
        self.castling_rights = undo.castling_rights;
    }

    /// Accepts the first legal move matching a "e2e4" / "a7a8q" string.
    pub fn parse_uci_move(&mut self, s: &str) -> Option<Move> {
        if !s.is_ascii() || s.len() < 4 {
            return None;
        }
        let from = parse_square(&s[0..2])?;
        let to = parse_square(&s[2..4])?;
        let promotion = s.chars().nth(4).map_or(PieceType::None, PieceType::from_char);

        let moves = self.legal_moves();
        moves
            .iter()
            .copied()
            .find(|m| m.from() == from && m.to() == to && (m.kind() != MoveKind::Promotion || m.promotion() == promotion))
    }
}
