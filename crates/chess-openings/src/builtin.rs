//! Built-in opening table.
//!
//! A compact table of common openings compiled into the library, used when
//! no external dataset is configured or reachable.

use crate::OpeningEntry;

/// `(eco, name, pgn)` rows.
const BUILTIN_ROWS: &[(&str, &str, &str)] = &[
    // Open games (1.e4 e5)
    ("C50", "Italian Game", "1. e4 e5 2. Nf3 Nc6 3. Bc4"),
    ("C53", "Italian Game: Giuoco Piano", "1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5"),
    ("C51", "Italian Game: Evans Gambit", "1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. b4"),
    ("C60", "Ruy Lopez", "1. e4 e5 2. Nf3 Nc6 3. Bb5"),
    ("C70", "Ruy Lopez: Morphy Defense", "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6"),
    ("C45", "Scotch Game", "1. e4 e5 2. Nf3 Nc6 3. d4"),
    ("C30", "King's Gambit", "1. e4 e5 2. f4"),
    ("C33", "King's Gambit Accepted", "1. e4 e5 2. f4 exf4"),
    ("C42", "Petrov's Defense", "1. e4 e5 2. Nf3 Nf6"),
    ("C47", "Four Knights Game", "1. e4 e5 2. Nf3 Nc6 3. Nc3 Nf6"),
    ("C25", "Vienna Game", "1. e4 e5 2. Nc3"),
    ("C23", "Bishop's Opening", "1. e4 e5 2. Bc4"),
    ("C41", "Philidor Defense", "1. e4 e5 2. Nf3 d6"),
    ("C21", "Danish Gambit", "1. e4 e5 2. d4 exd4 3. c3"),
    // Semi-open games
    ("B20", "Sicilian Defense", "1. e4 c5"),
    ("B30", "Sicilian Defense: Old Sicilian", "1. e4 c5 2. Nf3 Nc6"),
    ("B21", "Sicilian Defense: Smith-Morra Gambit", "1. e4 c5 2. d4 cxd4 3. c3"),
    (
        "B90",
        "Sicilian Defense: Najdorf Variation",
        "1. e4 c5 2. Nf3 d6 3. d4 cxd4 4. Nxd4 Nf6 5. Nc3 a6",
    ),
    (
        "B70",
        "Sicilian Defense: Dragon Variation",
        "1. e4 c5 2. Nf3 d6 3. d4 cxd4 4. Nxd4 Nf6 5. Nc3 g6",
    ),
    ("C00", "French Defense", "1. e4 e6"),
    ("C02", "French Defense: Advance Variation", "1. e4 e6 2. d4 d5 3. e5"),
    ("B10", "Caro-Kann Defense", "1. e4 c6"),
    (
        "B18",
        "Caro-Kann Defense: Classical Variation",
        "1. e4 c6 2. d4 d5 3. Nc3 dxe4 4. Nxe4 Bf5",
    ),
    ("B07", "Pirc Defense", "1. e4 d6 2. d4 Nf6 3. Nc3 g6"),
    ("B02", "Alekhine Defense", "1. e4 Nf6"),
    ("B01", "Scandinavian Defense", "1. e4 d5"),
    ("B06", "Modern Defense", "1. e4 g6"),
    // Closed games (1.d4 d5)
    ("D06", "Queen's Gambit", "1. d4 d5 2. c4"),
    ("D30", "Queen's Gambit Declined", "1. d4 d5 2. c4 e6"),
    ("D20", "Queen's Gambit Accepted", "1. d4 d5 2. c4 dxc4"),
    ("D10", "Slav Defense", "1. d4 d5 2. c4 c6"),
    ("D00", "Queen's Pawn Game: London System", "1. d4 d5 2. Bf4"),
    ("D05", "Queen's Pawn Game: Colle System", "1. d4 d5 2. Nf3 Nf6 3. e3"),
    ("D00", "Blackmar-Diemer Gambit", "1. d4 d5 2. e4 dxe4 3. Nc3"),
    // Indian defenses
    ("E60", "King's Indian Defense", "1. d4 Nf6 2. c4 g6"),
    (
        "E90",
        "King's Indian Defense: Normal Variation",
        "1. d4 Nf6 2. c4 g6 3. Nc3 Bg7 4. e4 d6 5. Nf3",
    ),
    ("E20", "Nimzo-Indian Defense", "1. d4 Nf6 2. c4 e6 3. Nc3 Bb4"),
    ("E12", "Queen's Indian Defense", "1. d4 Nf6 2. c4 e6 3. Nf3 b6"),
    ("E11", "Bogo-Indian Defense", "1. d4 Nf6 2. c4 e6 3. Nf3 Bb4+"),
    ("D80", "Grünfeld Defense", "1. d4 Nf6 2. c4 g6 3. Nc3 d5"),
    ("E00", "Catalan Opening", "1. d4 Nf6 2. c4 e6 3. g3"),
    ("A51", "Indian Defense: Budapest Defense", "1. d4 Nf6 2. c4 e5"),
    ("A57", "Benko Gambit", "1. d4 Nf6 2. c4 c5 3. d5 b5"),
    ("A60", "Benoni Defense", "1. d4 Nf6 2. c4 c5 3. d5"),
    (
        "A70",
        "Benoni Defense: Classical Variation",
        "1. d4 Nf6 2. c4 c5 3. d5 e6 4. Nc3 exd5 5. cxd5 d6",
    ),
    ("A45", "Trompowsky Attack", "1. d4 Nf6 2. Bg5"),
    ("A46", "Torre Attack", "1. d4 Nf6 2. Nf3 e6 3. Bg5"),
    ("A80", "Dutch Defense", "1. d4 f5"),
    ("A87", "Dutch Defense: Leningrad Variation", "1. d4 f5 2. g3 Nf6 3. Bg2 g6"),
    // Flank openings
    ("A10", "English Opening", "1. c4"),
    ("A30", "English Opening: Symmetrical Variation", "1. c4 c5"),
    ("A04", "Zukertort Opening", "1. Nf3"),
    ("A07", "King's Indian Attack", "1. Nf3 d5 2. g3"),
    ("A07", "King's Indian Attack: Main Line", "1. Nf3 d5 2. g3 Nf6 3. Bg2"),
    ("A02", "Bird Opening", "1. f4"),
    ("A01", "Nimzo-Larsen Attack", "1. b3"),
];

/// Returns the built-in opening lines.
#[must_use]
pub fn builtin_openings() -> Vec<OpeningEntry> {
    BUILTIN_ROWS
        .iter()
        .map(|(eco, name, pgn)| OpeningEntry::from_pgn(*eco, *name, pgn))
        .collect()
}
