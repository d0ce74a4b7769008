pub mod board;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod layout;
pub mod movegen;
pub mod play;
pub mod rules;
pub mod search;
pub mod square;

#[cfg(test)]
mod tests {
    use super::*;
    use board::{Color, Outcome, Piece, Position};
    use evaluation::Evaluator;
    use game::Game;
    use layout::{parse_diagram, Layout};
    use movegen::{Move, MoveGenerator, Promotion};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rules::{is_check, Rules};
    use search::Search;
    use square::Square;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn standard() -> Position {
        Layout::Standard.position(Color::White).unwrap()
    }

    fn find(moves: &[Move], from: &str, to: &str) -> Option<Move> {
        moves
            .iter()
            .find(|mv| mv.from == sq(from) && mv.to == sq(to))
            .copied()
    }

    fn play_all(game: &mut Game, moves: &[&str]) {
        for text in moves {
            let (from, to) = play::parse_move_input(text).unwrap();
            game.play(from, to).unwrap();
        }
    }

    fn perft(position: &mut Position, rules: &Rules, depth: u32) -> u64 {
        let moves = rules.legal_moves(position);
        if depth == 1 {
            return moves.len() as u64;
        }

        let mut nodes = 0;
        for mv in &moves {
            position.apply(mv);
            nodes += perft(position, rules, depth - 1);
            position.undo(mv);
        }
        nodes
    }

    fn assert_round_trip(position: &mut Position, rules: &Rules) {
        let moves = rules.legal_moves(position);
        for mv in &moves {
            let snapshot = position.clone();
            position.apply(mv);
            assert_ne!(*position, snapshot);
            position.undo(mv);
            assert_eq!(*position, snapshot, "apply/undo of {}{} changed the position", mv.from, mv.to);
        }
    }

    #[test]
    fn test_initial_position() {
        let mut position = standard();
        let rules = Rules::default();

        let pseudo = rules.generator.generate_moves(&position, Color::White);
        let legal = rules.legal_moves(&mut position);

        // White should have 20 legal moves in the initial position
        assert_eq!(pseudo.len(), 20);
        assert_eq!(legal, pseudo);
    }

    #[test]
    fn test_perft_initial_position() {
        let mut position = standard();
        let rules = Rules::default();

        assert_eq!(perft(&mut position, &rules, 1), 20);
        assert_eq!(perft(&mut position, &rules, 2), 400);
        assert_eq!(perft(&mut position, &rules, 3), 8902);
        assert_eq!(position, standard());
    }

    #[test]
    fn test_apply_undo_round_trip() {
        let rules = Rules::default();
        let castle_and_promote = "\
            .r..k..r
            P......p
            ........
            ...pP...
            ........
            ........
            p......P
            .R..K..R";
        let starts = vec![
            standard(),
            Layout::Checkmate.position(Color::White).unwrap(),
            Layout::Pin.position(Color::White).unwrap(),
            parse_diagram(castle_and_promote, Color::White).unwrap(),
            parse_diagram(castle_and_promote, Color::Black).unwrap(),
        ];

        for (seed, start) in starts.into_iter().enumerate() {
            let mut rng = StdRng::seed_from_u64(seed as u64);
            let mut position = start;
            for _ in 0..30 {
                assert_round_trip(&mut position, &rules);
                let moves = rules.legal_moves(&mut position);
                let Some(mv) = moves.choose(&mut rng) else {
                    break;
                };
                position.apply(mv);
            }
        }
    }

    #[test]
    fn test_board_and_registry_agree() {
        let rules = Rules::default();
        let mut rng = StdRng::seed_from_u64(42);
        let mut position = standard();

        for _ in 0..40 {
            for (handle, record) in position.registry.iter() {
                if record.alive {
                    assert_eq!(position.board.get(record.square), Some(handle));
                } else {
                    assert_ne!(position.board.get(record.square), Some(handle));
                }
            }
            let moves = rules.legal_moves(&mut position);
            let Some(mv) = moves.choose(&mut rng) else {
                break;
            };
            assert_eq!(position.registry[mv.piece].color, position.state.side_to_move);
            position.apply(mv);
        }
    }

    #[test]
    fn test_checkmate_layout() {
        let mut game = Game::from_position(Layout::Checkmate.position(Color::White).unwrap());
        assert!(!game.position().state.check);

        game.play(sq("f3"), sq("f7")).unwrap();

        let state = game.position().state;
        assert!(state.check);
        assert!(state.checkmate);
        assert!(!state.stalemate);
        assert_eq!(state.outcome(), Some(Outcome::Checkmate { winner: Color::White }));
        assert!(game.legal_moves().is_empty());
        assert!(game.is_over());

        let mut position = game.position().clone();
        let rules = Rules::default();
        assert!(rules.is_checkmate(&mut position));
        assert!(rules.has_no_legal_moves(&mut position));
    }

    #[test]
    fn test_stalemate_is_not_checkmate() {
        let diagram = "\
            k.......
            ........
            .Q......
            ........
            ........
            ........
            ........
            .......K";
        let game = Game::from_position(parse_diagram(diagram, Color::Black).unwrap());
        let state = game.position().state;
        assert!(game.legal_moves().is_empty());
        assert!(!state.check);
        assert!(!state.checkmate);
        assert!(state.stalemate);
        assert_eq!(state.outcome(), Some(Outcome::Stalemate));
    }

    #[test]
    fn test_pinned_rook_stays_on_the_line() {
        let mut position = Layout::Pin.position(Color::White).unwrap();
        let rules = Rules::default();
        let rook = position.board.get(sq("d5")).unwrap();

        let pseudo: Vec<Move> = rules
            .generator
            .generate_moves(&position, Color::White)
            .into_iter()
            .filter(|mv| mv.piece == rook)
            .collect();
        assert_eq!(pseudo.len(), 13);

        let legal = rules.legal_moves(&mut position);
        let rook_moves: Vec<&Move> = legal.iter().filter(|mv| mv.piece == rook).collect();
        assert_eq!(rook_moves.len(), 6);
        assert!(rook_moves.iter().all(|mv| mv.to.file == sq("d5").file));
        assert!(find(&legal, "d5", "d1").unwrap().is_capture());

        // Off the line the king is exposed
        let off_line = pseudo.iter().find(|mv| mv.to == sq("a5")).unwrap();
        position.apply(off_line);
        assert!(rules.is_in_check(&position, Color::White));
        position.undo(off_line);
        assert!(!rules.is_in_check(&position, Color::White));
    }

    #[test]
    fn test_is_check_ignores_pawn_pushes() {
        let diagram = "\
            ........
            ........
            ........
            ....k...
            ........
            ....P...
            ........
            .......K";
        let position = parse_diagram(diagram, Color::Black).unwrap();
        let rules = Rules::default();
        let king = position.king_square(Color::Black).unwrap();

        let threats = rules.generator.generate_threats(&position, Color::White);
        assert!(!is_check(king, &threats));
        // The pawn still covers both diagonals even though they are empty
        assert!(threats.iter().any(|mv| mv.to == sq("d4") && mv.pot_threat));
        assert!(threats.iter().any(|mv| mv.to == sq("f4") && mv.pot_threat));

        let pushes = rules.generator.generate_moves(&position, Color::White);
        let push = find(&pushes, "e3", "e4").unwrap();
        assert!(!push.pot_threat);
    }

    #[test]
    fn test_king_cannot_step_into_pawn_diagonal() {
        let diagram = "\
            ........
            ........
            ........
            ....k...
            ........
            ....P...
            ........
            .......K";
        let mut position = parse_diagram(diagram, Color::Black).unwrap();
        let legal = Rules::default().legal_moves(&mut position);
        assert!(find(&legal, "e5", "d4").is_none());
        assert!(find(&legal, "e5", "f4").is_none());
        assert!(find(&legal, "e5", "e4").is_some());
    }

    #[test]
    fn test_en_passant() {
        let mut game = Game::from_position(standard());
        play_all(&mut game, &["e2 e4", "a7 a6", "e4 e5", "d7 d5"]);

        let mv = game.find_move(sq("e5"), sq("d6")).unwrap();
        assert!(mv.is_en_passant);
        let black_pawn = game.position().board.get(sq("d5")).unwrap();
        assert_eq!(mv.captured, Some(black_pawn));

        game.play(sq("e5"), sq("d6")).unwrap();
        let position = game.position();
        assert_eq!(position.board.get(sq("d5")), None);
        assert_eq!(position.board.get(sq("d6")), Some(mv.piece));
        assert!(!position.registry[black_pawn].alive);

        game.undo_last().unwrap();
        let position = game.position();
        assert_eq!(position.board.get(sq("d5")), Some(black_pawn));
        assert_eq!(position.board.get(sq("d6")), None);
        assert_eq!(position.board.get(sq("e5")), Some(mv.piece));
        assert!(position.registry[black_pawn].alive);
        assert_eq!(position.registry[black_pawn].square, sq("d5"));
    }

    #[test]
    fn test_en_passant_expires() {
        let mut game = Game::from_position(standard());
        play_all(&mut game, &["e2 e4", "a7 a6", "e4 e5", "d7 d5", "h2 h3", "h7 h6"]);
        assert!(game.find_move(sq("e5"), sq("d6")).is_none());
    }

    #[test]
    fn test_black_en_passant() {
        let mut game = Game::from_position(standard());
        play_all(&mut game, &["a2 a3", "d7 d5", "a3 a4", "d5 d4", "e2 e4"]);
        let mv = game.find_move(sq("d4"), sq("e3")).unwrap();
        assert!(mv.is_en_passant);
        game.play(sq("d4"), sq("e3")).unwrap();
        assert_eq!(game.position().board.get(sq("e4")), None);
    }

    const CASTLING: &str = "\
        ....k...
        ........
        ........
        ........
        ........
        ........
        ........
        R...K..R";

    fn castles(position: &mut Position) -> Vec<Move> {
        Rules::default()
            .legal_moves(position)
            .into_iter()
            .filter(|mv| mv.is_castling())
            .collect()
    }

    #[test]
    fn test_castling() {
        let mut position = parse_diagram(CASTLING, Color::White).unwrap();
        let moves = castles(&mut position);
        assert_eq!(moves.len(), 2);

        let kingside = find(&moves, "e1", "g1").unwrap();
        let queenside = find(&moves, "e1", "c1").unwrap();
        assert!(!kingside.pot_threat);

        let snapshot = position.clone();
        position.apply(&kingside);
        let (_, rook) = position.piece_at(sq("f1")).unwrap();
        assert_eq!(rook.kind, Piece::Rook);
        assert!(rook.has_moved);
        assert!(position.board.is_empty(sq("h1")));
        position.undo(&kingside);
        assert_eq!(position, snapshot);

        position.apply(&queenside);
        assert_eq!(position.piece_at(sq("d1")).unwrap().1.kind, Piece::Rook);
        assert_eq!(position.piece_at(sq("c1")).unwrap().1.kind, Piece::King);
        position.undo(&queenside);
        assert_eq!(position, snapshot);
    }

    #[test]
    fn test_castling_through_attacked_squares() {
        // Transit square f1 attacked
        let transit = CASTLING.replacen("....k...", "....kr..", 1);
        let mut position = parse_diagram(&transit, Color::White).unwrap();
        let moves = castles(&mut position);
        assert!(find(&moves, "e1", "g1").is_none());
        assert!(find(&moves, "e1", "c1").is_some());

        // Destination square g1 attacked
        let destination = CASTLING.replacen("....k...", "....k.r.", 1);
        let mut position = parse_diagram(&destination, Color::White).unwrap();
        let moves = castles(&mut position);
        assert!(find(&moves, "e1", "g1").is_none());
        assert!(find(&moves, "e1", "c1").is_some());

        // Only the rook crosses b1, so queenside stays legal
        let rook_path = CASTLING.replacen("....k...", ".r..k...", 1);
        let mut position = parse_diagram(&rook_path, Color::White).unwrap();
        assert!(find(&castles(&mut position), "e1", "c1").is_some());

        // No castling out of check
        let check = CASTLING.replacen("....k...", "....kr..", 1).replacen("........", "....r...", 1);
        let mut position = parse_diagram(&check, Color::White).unwrap();
        assert!(castles(&mut position).is_empty());
    }

    #[test]
    fn test_castling_blocked_by_pawn_reach() {
        let diagram = "\
            ....k..r
            ......P.
            ........
            ........
            ........
            ........
            ........
            ....K...";
        let mut position = parse_diagram(diagram, Color::Black).unwrap();
        assert!(castles(&mut position).is_empty());

        let without_pawn = diagram.replacen("......P.", "P.......", 1);
        let mut position = parse_diagram(&without_pawn, Color::Black).unwrap();
        assert!(find(&castles(&mut position), "e8", "g8").is_some());
    }

    #[test]
    fn test_castling_after_pieces_moved_back() {
        let mut game = Game::from_position(parse_diagram(CASTLING, Color::White).unwrap());
        play_all(&mut game, &["h1 h2", "e8 e7", "h2 h1", "e7 e8"]);
        let moves: Vec<Move> = game.legal_moves().iter().filter(|mv| mv.is_castling()).copied().collect();
        assert!(find(&moves, "e1", "g1").is_none());
        assert!(find(&moves, "e1", "c1").is_some());

        let mut game = Game::from_position(parse_diagram(CASTLING, Color::White).unwrap());
        play_all(&mut game, &["e1 e2", "e8 e7", "e2 e1", "e7 e8"]);
        assert!(game.legal_moves().iter().all(|mv| !mv.is_castling()));

        // Taking the moves back restores the right to castle
        for _ in 0..4 {
            game.undo_last().unwrap();
        }
        assert_eq!(game.legal_moves().iter().filter(|mv| mv.is_castling()).count(), 2);
    }

    #[test]
    fn test_promotion() {
        let diagram = "\
            ....k...
            P.......
            ........
            ........
            ........
            ........
            ........
            ....K...";
        let mut position = parse_diagram(diagram, Color::White).unwrap();
        let rules = Rules::new(MoveGenerator::with_promotion(Piece::Knight));
        let moves = rules.legal_moves(&mut position);

        let pawn_moves: Vec<&Move> = moves.iter().filter(|mv| mv.from == sq("a7")).collect();
        assert_eq!(pawn_moves.len(), 1);
        let mv = *pawn_moves[0];
        assert_eq!(
            mv.promotion,
            Some(Promotion {
                from: Piece::Pawn,
                to: Piece::Knight
            })
        );

        let snapshot = position.clone();
        position.apply(&mv);
        let record = &position.registry[mv.piece];
        assert_eq!(record.kind, Piece::Knight);
        assert_eq!(record.history.len(), 1);
        assert_eq!(position.board.get(sq("a8")), Some(mv.piece));

        position.undo(&mv);
        assert_eq!(position.registry[mv.piece].kind, Piece::Pawn);
        assert_eq!(position, snapshot);
    }

    #[test]
    fn test_sliding_capture_from_the_edge() {
        let diagram = "\
            ....k...
            ........
            ........
            ........
            ........
            ........
            p.......
            R...K...";
        let mut position = parse_diagram(diagram, Color::White).unwrap();
        let moves = Rules::default().legal_moves(&mut position);
        assert!(find(&moves, "a1", "a2").unwrap().is_capture());
    }

    #[test]
    fn test_material_and_depth_zero_score() {
        let mut position = Layout::Score.position(Color::White).unwrap();
        let evaluator = Evaluator::new();
        assert_eq!(evaluator.material(&position), 10 - 30);

        let rules = Rules::default();
        let moves = rules.legal_moves(&mut position);
        assert_eq!(moves.len(), 2);

        let mut search = Search::new(rules);
        search.set_depth(0).unwrap();
        let snapshot = position.clone();
        let result = search.find_best_move(&mut position, &moves).unwrap();

        // Material -20, then one pawn move against eight knight moves
        assert_eq!(result.score, -20 + (1 - 8));
        assert_eq!(result.nodes, 2);
        assert!(result.tree.iter().all(|node| node.children.is_empty()));
        assert_eq!(result.best_move.from, sq("a2"));
        assert_eq!(position, snapshot);
    }

    #[test]
    fn test_search_takes_free_material() {
        let diagram = "\
            k.......
            ........
            ........
            ...r....
            ........
            ........
            ........
            ...Q...K";
        let mut position = parse_diagram(diagram, Color::White).unwrap();
        let rules = Rules::default();
        let moves = rules.legal_moves(&mut position);
        let snapshot = position.clone();

        let mut search = Search::new(rules);
        search.set_depth(1).unwrap();
        let result = search.find_best_move(&mut position, &moves).unwrap();
        assert_eq!((result.best_move.from, result.best_move.to), (sq("d1"), sq("d5")));
        assert_eq!(position, snapshot);

        // Each root child backs up the lowest reply score
        for node in result.tree.iter().filter(|node| !node.children.is_empty()) {
            let lowest = node.children.iter().map(|child| child.score).min().unwrap();
            assert_eq!(node.score, lowest);
        }
    }

    #[test]
    fn test_search_for_black_minimises() {
        let diagram = "\
            ...q...k
            ........
            ........
            ........
            ...R....
            ........
            ........
            K.......";
        let mut position = parse_diagram(diagram, Color::Black).unwrap();
        let rules = Rules::default();
        let moves = rules.legal_moves(&mut position);

        let mut search = Search::new(rules);
        search.set_depth(0).unwrap();
        let result = search.find_best_move(&mut position, &moves).unwrap();
        assert_eq!((result.best_move.from, result.best_move.to), (sq("d8"), sq("d4")));
        let lowest = result.tree.iter().map(|node| node.score).min().unwrap();
        assert_eq!(result.score, lowest);
    }

    #[test]
    fn test_search_depth_limit() {
        let mut search = Search::new(Rules::default());
        assert!(search.set_depth(3).is_ok());
        assert!(search.set_depth(4).is_err());
        search.set_max_depth(5);
        assert!(search.set_depth(5).is_ok());
        assert_eq!(search.depth(), 5);
    }

    #[test]
    fn test_seeded_search_is_repeatable() {
        let rules = Rules::default();
        let mut first = Search::new(rules.clone());
        let mut second = Search::new(rules.clone());
        first.set_seed(11);
        second.set_seed(11);

        let mut position = Layout::Score.position(Color::White).unwrap();
        let moves = rules.legal_moves(&mut position);
        let a = first.find_best_move(&mut position, &moves).unwrap();
        let b = second.find_best_move(&mut position, &moves).unwrap();
        assert_eq!(a.best_move, b.best_move);
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn test_game_rejects_illegal_moves() {
        let mut game = Game::from_position(standard());
        // Wrong side, impossible pawn jump, empty square
        assert!(game.play(sq("e7"), sq("e5")).is_err());
        assert!(game.play(sq("e2"), sq("e5")).is_err());
        assert!(game.play(sq("e4"), sq("e5")).is_err());
        assert!(game.position().plies().is_empty());
        assert_eq!(game.legal_moves().len(), 20);
        assert!(game.undo_last().is_none());
    }

    #[test]
    fn test_game_recommends_a_legal_move() {
        let mut game = Game::from_position(standard());
        let result = game.best_move().unwrap();
        assert!(game.legal_moves().contains(&result.best_move));
        assert_eq!(result.tree.len(), 20);
        assert_eq!(game.position(), &standard());
    }
}
