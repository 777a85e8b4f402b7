use crate::bitboard::{
    lookup_between, lookup_king_attack, lookup_knight_attack, lookup_line, lookup_pawn_attack, pop_lsb, rank_of,
    BIT_SQUARES,
};
use crate::board::{Board, Color, PieceType, BLACK_KINGSIDE, BLACK_QUEENSIDE, WHITE_KINGSIDE, WHITE_QUEENSIDE};
use crate::magic_bitboard::{lookup_bishop_attack, lookup_queen_attack, lookup_rook_attack};
use crate::moves::{Move, MoveKind, MoveList};

impl Board {
    pub fn legal_moves(&mut self) -> MoveList {
        let mut moves = MoveList::new();
        self.generate_legal_moves(&mut moves);
        moves
    }

    /// Single-pass legal move generation: no pseudo-legal post-filter. Pins
    /// and checks are resolved up front; only en passant falls back to
    /// play-and-test.
    pub fn generate_legal_moves(&mut self, moves: &mut MoveList) {
        moves.clear();

        let us = self.side_to_move;
        let them = !us;
        let ksq = self.king_sq(us);
        let checkers = self.checkers();
        let num_checkers = checkers.count_ones();

        // A piece is pinned if it is the only thing between the king and an
        // enemy slider; look through our own pieces to find the sliders.
        let mut pinned = 0u64;
        let occ_no_us = self.occupied ^ self.by_color[us as usize];
        let mut pinners = (lookup_rook_attack(ksq, occ_no_us)
            & (self.piece_bb(them, PieceType::Rook) | self.piece_bb(them, PieceType::Queen)))
            | (lookup_bishop_attack(ksq, occ_no_us)
                & (self.piece_bb(them, PieceType::Bishop) | self.piece_bb(them, PieceType::Queen)));
        while pinners != 0 {
            let pinner = pop_lsb(&mut pinners);
            let between = lookup_between(ksq, pinner) & self.occupied;
            if between.count_ones() == 1 {
                pinned |= between & self.by_color[us as usize];
            }
        }

        // King moves, querying attacks with the king's own square vacated
        let mut king_moves = lookup_king_attack(ksq) & !self.by_color[us as usize];
        while king_moves != 0 {
            let to = pop_lsb(&mut king_moves);
            let new_occ = (self.occupied ^ BIT_SQUARES[ksq as usize]) | BIT_SQUARES[to as usize];
            if self.attackers_to(to, new_occ, them) == 0 {
                moves.push(Move::normal(ksq, to));
            }
        }

        // Double check: only king moves are legal
        if num_checkers > 1 {
            return;
        }

        let mut target_mask = !0u64;
        if num_checkers == 1 {
            // Block the check or capture the checker
            let checker_sq = checkers.trailing_zeros() as u8;
            target_mask = lookup_between(ksq, checker_sq) | checkers;
        }

        for piece_type in [PieceType::Pawn, PieceType::Knight, PieceType::Bishop, PieceType::Rook, PieceType::Queen] {
            self.generate_piece_moves(moves, piece_type, us, them, ksq, pinned, target_mask);
        }

        if num_checkers == 0 {
            self.generate_castling(moves, us, them);
        }

        if self.ep_square.is_some() {
            self.generate_en_passant(moves, us, them);
        }
    }

    fn generate_piece_moves(
        &self,
        moves: &mut MoveList,
        piece_type: PieceType,
        us: Color,
        them: Color,
        ksq: u8,
        pinned: u64,
        target_mask: u64,
    ) {
        let mut pieces = self.piece_bb(us, piece_type);

        while pieces != 0 {
            let from = pop_lsb(&mut pieces);
            let is_pinned = pinned & BIT_SQUARES[from as usize] != 0;

            if piece_type == PieceType::Pawn {
                self.generate_pawn_moves(moves, from, us, them, ksq, is_pinned, target_mask);
                continue;
            }

            // A pinned knight can never move
            if piece_type == PieceType::Knight && is_pinned {
                continue;
            }

            let mut attacks = match piece_type {
                PieceType::Knight => lookup_knight_attack(from),
                PieceType::Bishop => lookup_bishop_attack(from, self.occupied),
                PieceType::Rook => lookup_rook_attack(from, self.occupied),
                PieceType::Queen => lookup_queen_attack(from, self.occupied),
                _ => 0,
            };

            attacks &= !self.by_color[us as usize] & target_mask;
            if is_pinned {
                attacks &= lookup_line(ksq, from);
            }

            while attacks != 0 {
                moves.push(Move::normal(from, pop_lsb(&mut attacks)));
            }
        }
    }

    fn generate_pawn_moves(
        &self,
        moves: &mut MoveList,
        from: u8,
        us: Color,
        them: Color,
        ksq: u8,
        is_pinned: bool,
        target_mask: u64,
    ) {
        let forward: i8 = if us == Color::White { 8 } else { -8 };
        let start_rank = if us == Color::White { 1 } else { 6 };
        let promo_rank = if us == Color::White { 6 } else { 1 };
        let rank = rank_of(from);

        let pin_ray = if is_pinned { lookup_line(ksq, from) } else { !0u64 };

        // Pushes: destination empty and on the pin ray. Only the single push
        // has to satisfy the check target mask; a double push needs it on the
        // final square, not the one it passes through.
        let to = (from as i8 + forward) as u8;
        if self.is_empty(to) && BIT_SQUARES[to as usize] & pin_ray != 0 {
            if BIT_SQUARES[to as usize] & target_mask != 0 {
                if rank == promo_rank {
                    push_promotions(moves, from, to);
                } else {
                    moves.push(Move::normal(from, to));
                }
            }

            if rank == start_rank {
                let to2 = (to as i8 + forward) as u8;
                if self.is_empty(to2)
                    && BIT_SQUARES[to2 as usize] & target_mask != 0
                    && BIT_SQUARES[to2 as usize] & pin_ray != 0
                {
                    moves.push(Move::normal(from, to2));
                }
            }
        }

        let mut attacks = lookup_pawn_attack(from, us == Color::White) & self.by_color[them as usize] & target_mask & pin_ray;
        while attacks != 0 {
            let cap_sq = pop_lsb(&mut attacks);
            if rank == promo_rank {
                push_promotions(moves, from, cap_sq);
            } else {
                moves.push(Move::normal(from, cap_sq));
            }
        }
    }

    fn generate_castling(&self, moves: &mut MoveList, us: Color, them: Color) {
        let ksq = if us == Color::White { 4 } else { 60 };

        let kingside = if us == Color::White { WHITE_KINGSIDE } else { BLACK_KINGSIDE };
        if self.castling_rights & kingside != 0 {
            let f1 = ksq + 1;
            let g1 = ksq + 2;
            if self.is_empty(f1) && self.is_empty(g1) && !self.is_attacked(f1, them) && !self.is_attacked(g1, them) {
                moves.push(Move::new(ksq, g1, MoveKind::Castling, PieceType::Knight));
            }
        }

        let queenside = if us == Color::White { WHITE_QUEENSIDE } else { BLACK_QUEENSIDE };
        if self.castling_rights & queenside != 0 {
            let d1 = ksq - 1;
            let c1 = ksq - 2;
            let b1 = ksq - 3;
            // The rook passes over b1, so it only has to be empty
            if self.is_empty(d1)
                && self.is_empty(c1)
                && self.is_empty(b1)
                && !self.is_attacked(d1, them)
                && !self.is_attacked(c1, them)
            {
                moves.push(Move::new(ksq, c1, MoveKind::Castling, PieceType::Knight));
            }
        }
    }

    /// Play-and-test: removing both pawns can expose the king to a rook on
    /// the shared rank, which no pin mask models.
    fn generate_en_passant(&mut self, moves: &mut MoveList, us: Color, them: Color) {
        let Some(ep_square) = self.ep_square else {
            return;
        };

        let mut pawns = self.piece_bb(us, PieceType::Pawn) & lookup_pawn_attack(ep_square, them == Color::White);
        while pawns != 0 {
            let from = pop_lsb(&mut pawns);

            let m = Move::new(from, ep_square, MoveKind::EnPassant, PieceType::Knight);
            let undo = self.make_move(m);
            let legal = !undo.is_invalid() && !self.is_attacked(self.king_sq(us), them);
            self.unmake_move(m, undo);

            if legal {
                moves.push(m);
            }
        }
    }
}

fn push_promotions(moves: &mut MoveList, from: u8, to: u8) {
    moves.push(Move::new(from, to, MoveKind::Promotion, PieceType::Queen));
    moves.push(Move::new(from, to, MoveKind::Promotion, PieceType::Rook));
    moves.push(Move::new(from, to, MoveKind::Promotion, PieceType::Bishop));
    moves.push(Move::new(from, to, MoveKind::Promotion, PieceType::Knight));
}

#[cfg(test)]
mod move_generator_tests {
    use super::*;

    #[test]
    fn twenty_moves_from_the_starting_position() {
        let mut board = Board::startpos();
        assert_eq!(board.legal_moves().len(), 20);
    }

    #[test]
    fn kiwipete_has_48_moves() {
        let mut board =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(board.legal_moves().len(), 48);
    }

    #[test]
    fn stalemate_has_no_moves() {
        let mut board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!board.in_check());
        assert!(board.legal_moves().is_empty());
    }

    #[test]
    fn double_check_allows_only_king_moves() {
        // Knight on f6 and rook on e1 both give check
        let mut board = Board::from_fen("4k3/8/5N2/8/8/8/8/4R2K b - - 0 1").unwrap();
        assert_eq!(board.checkers().count_ones(), 2);
        let moves = board.legal_moves();
        assert!(!moves.is_empty());
        for m in &moves {
            assert_eq!(m.from(), board.king_sq(Color::Black));
        }
    }

    #[test]
    fn check_must_be_blocked_captured_or_escaped() {
        // Rook on e8 checks the king on e1; the a1 rook cannot reach the
        // e-file to block, so every reply is a king move off the file
        let mut board = Board::from_fen("4r2k/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        let moves = board.legal_moves();
        assert!(moves.iter().all(|m| m.from() == 4));
        let ucis: Vec<String> = moves.iter().map(|m| m.to_uci()).collect();
        for escape in ["e1d1", "e1d2", "e1f1", "e1f2"] {
            assert!(ucis.contains(&String::from(escape)));
        }
        // Still on the rook's file, and no castling out of check
        assert!(!ucis.contains(&String::from("e1e2")));
        assert!(!ucis.contains(&String::from("e1c1")));
    }

    #[test]
    fn pinned_pieces_stay_on_the_pin_ray() {
        // Black rook on e8 pins the knight on e4: the knight may not move
        let mut board = Board::from_fen("4r2k/8/8/8/4N3/8/8/4K3 w - - 0 1").unwrap();
        let moves = board.legal_moves();
        for m in &moves {
            assert_ne!(m.from(), 28, "pinned knight moved: {}", m.to_uci());
        }

        // Bishop on h4 pins the f2 rook diagonally: a rook cannot slide on
        // a diagonal, so it has no moves at all
        let mut board = Board::from_fen("4k3/8/8/8/7b/8/5R2/4K3 w - - 0 1").unwrap();
        let moves = board.legal_moves();
        assert!(moves.iter().all(|m| m.from() != 13));

        // A queen pinned on a file still slides along it
        let mut board = Board::from_fen("4r2k/8/8/8/4Q3/8/8/4K3 w - - 0 1").unwrap();
        let moves = board.legal_moves();
        let queen_moves: Vec<&Move> = moves.iter().filter(|m| m.from() == 28).collect();
        assert!(!queen_moves.is_empty());
        for m in queen_moves {
            assert_eq!(m.to() & 7, 4, "pinned queen left the e-file: {}", m.to_uci());
        }
    }

    #[test]
    fn promotions_generate_all_four_pieces() {
        let mut board = Board::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").unwrap();
        let moves = board.legal_moves();
        let promos: Vec<&Move> = moves.iter().filter(|m| m.kind() == MoveKind::Promotion).collect();
        assert_eq!(promos.len(), 4);
        let pieces: Vec<PieceType> = promos.iter().map(|m| m.promotion()).collect();
        for piece in [PieceType::Queen, PieceType::Rook, PieceType::Bishop, PieceType::Knight] {
            assert!(pieces.contains(&piece));
        }
    }

    #[test]
    fn en_passant_pinned_along_the_rank_is_suppressed() {
        // Rook on h4 shares the fourth rank with the b4 king and both pawns;
        // e4xd3 would remove both shields at once and is illegal
        let mut board = Board::from_fen("8/8/8/8/1k1Pp2R/8/8/4K3 b - d3 0 1").unwrap();
        let moves = board.legal_moves();
        assert!(!moves.iter().any(|m| m.kind() == MoveKind::EnPassant));
        // The pawn still has its quiet push
        assert!(moves.iter().any(|m| m.to_uci() == "e4e3"));
    }

    #[test]
    fn en_passant_capturing_the_checker_is_legal() {
        // d2d4 just gave check from d4; capturing it en passant resolves
        // the check and nothing else attacks the king afterwards
        let mut board = Board::from_fen("8/8/8/2k5/3Pp3/8/8/4K1R1 b - d3 0 1").unwrap();
        assert!(board.in_check());
        let moves = board.legal_moves();
        assert!(moves.iter().any(|m| m.kind() == MoveKind::EnPassant && m.to_uci() == "e4d3"));
    }

    #[test]
    fn castling_through_attack_is_illegal() {
        // Black rook on f8 covers f1: no white kingside castling
        let mut board = Board::from_fen("5r1k/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let moves = board.legal_moves();
        let ucis: Vec<String> = moves.iter().map(|m| m.to_uci()).collect();
        assert!(!ucis.contains(&String::from("e1g1")));
        assert!(ucis.contains(&String::from("e1c1")));
    }

    #[test]
    fn double_push_may_block_a_check_the_single_push_cannot() {
        // Bishop on a5 checks along a5-b4-c3-d2. b2b4 interposes on b4 even
        // though the b3 square it passes through does not block the check;
        // b2b3 stays illegal.
        let mut board = Board::from_fen("4k3/8/8/b7/8/8/1P6/4K3 w - - 0 1").unwrap();
        assert!(board.in_check());
        let moves = board.legal_moves();
        let ucis: Vec<String> = moves.iter().map(|m| m.to_uci()).collect();
        assert!(ucis.contains(&String::from("b2b4")));
        assert!(!ucis.contains(&String::from("b2b3")));
        assert!(ucis.contains(&String::from("e1e2")));
    }
}
