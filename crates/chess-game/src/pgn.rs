//! PGN (Portable Game Notation) import and export.
//!
//! Import reads the header tags and the mainline SAN of the first game in the
//! text; variations and comments in the source are skipped. Export writes the
//! Seven Tag Roster, the remaining tags, and numbered mainline moves with
//! optional per-ply glyphs and comments.

use crate::{GameError, Headers, Ply, SEVEN_TAG_ROSTER};
use chrono::Local;
use pgn_reader::{RawTag, Reader, SanPlus, Skip, Visitor};
use shakmaty::{Chess, Position};
use std::ops::ControlFlow;

const LINE_WIDTH: usize = 80;

/// A game read from PGN text.
#[derive(Debug, Clone)]
pub struct ParsedGame {
    pub headers: Headers,
    pub plies: Vec<Ply>,
}

/// Glyph and comment attached to one exported ply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlyAnnotation {
    /// Move-quality glyph appended to the SAN, e.g. `?!` or `??`.
    pub glyph: Option<String>,
    /// Text written as `{comment}` after the move.
    pub comment: Option<String>,
}

struct GameCollector;

struct Movetext {
    headers: Headers,
    pos: Chess,
    plies: Vec<Ply>,
    error: Option<GameError>,
}

impl Visitor for GameCollector {
    type Tags = Headers;
    type Movetext = Movetext;
    type Output = Result<ParsedGame, GameError>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Headers> {
        ControlFlow::Continue(Headers::new())
    }

    fn tag(&mut self, tags: &mut Headers, name: &[u8], value: RawTag<'_>) -> ControlFlow<Self::Output> {
        let name = String::from_utf8_lossy(name);
        tags.set(&name, value.decode_utf8_lossy().into_owned());
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Headers) -> ControlFlow<Self::Output, Movetext> {
        // Replay always starts from the standard position.
        let error = tags.get("FEN").map(|fen| {
            GameError::Parse(format!("games from a set-up position are not supported: {}", fen))
        });
        ControlFlow::Continue(Movetext {
            headers: tags,
            pos: Chess::default(),
            plies: Vec::new(),
            error,
        })
    }

    fn san(&mut self, state: &mut Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        if state.error.is_some() {
            return ControlFlow::Continue(());
        }
        match san_plus.san.to_move(&state.pos) {
            Ok(mv) => {
                state.plies.push(Ply::from_move(&state.pos, mv));
                state.pos.play_unchecked(mv);
            }
            Err(_) => {
                state.error = Some(GameError::Parse(format!(
                    "illegal move '{}' at ply {}",
                    san_plus,
                    state.plies.len() + 1
                )));
            }
        }
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _: &mut Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, state: Movetext) -> Self::Output {
        if let Some(err) = state.error {
            return Err(err);
        }
        if state.headers.is_empty() && state.plies.is_empty() {
            return Err(GameError::Parse("no game found".to_string()));
        }
        Ok(ParsedGame {
            headers: state.headers,
            plies: state.plies,
        })
    }
}

/// Parses the first game in `text`.
///
/// # Errors
///
/// Returns [`GameError::Parse`] if there is no game, the text cannot be read,
/// or a move is illegal.
pub fn parse_game(text: &str) -> Result<ParsedGame, GameError> {
    let mut reader = Reader::new(text.as_bytes());
    match reader.read_game(&mut GameCollector) {
        Ok(Some(result)) => result,
        Ok(None) => Err(GameError::Parse("no game found".to_string())),
        Err(e) => Err(GameError::Parse(e.to_string())),
    }
}

/// Writes a game as PGN text.
///
/// Missing roster tags are filled in (`Date` with today's date, `Result`
/// with `*`, the rest with `?`). `annotations[i]` belongs to `plies[i]`;
/// missing entries mean no annotation.
#[must_use]
pub fn write_game<'a, I>(headers: &Headers, plies: I, annotations: &[PlyAnnotation]) -> String
where
    I: IntoIterator<Item = &'a Ply>,
{
    let mut out = String::new();

    for name in SEVEN_TAG_ROSTER {
        let value = match (headers.get(name), name) {
            (Some(v), _) => v.to_string(),
            (None, "Date") => Local::now().format("%Y.%m.%d").to_string(),
            (None, "Result") => "*".to_string(),
            (None, _) => "?".to_string(),
        };
        out.push_str(&format!("[{} \"{}\"]\n", name, escape(&value)));
    }
    for (name, value) in headers.iter() {
        if !SEVEN_TAG_ROSTER.contains(&name) {
            out.push_str(&format!("[{} \"{}\"]\n", name, escape(value)));
        }
    }
    out.push('\n');

    let mut tokens: Vec<String> = Vec::new();
    let mut after_comment = false;
    for (i, ply) in plies.into_iter().enumerate() {
        let number = i / 2 + 1;
        if i % 2 == 0 {
            tokens.push(format!("{}.", number));
        } else if after_comment {
            tokens.push(format!("{}...", number));
        }

        let note = annotations.get(i);
        let glyph = note.and_then(|a| a.glyph.as_deref()).unwrap_or("");
        tokens.push(format!("{}{}", ply.san(), glyph));

        after_comment = false;
        if let Some(comment) = note.and_then(|a| a.comment.as_deref()) {
            let comment = comment.replace('}', ")");
            if !comment.trim().is_empty() {
                tokens.push(format!("{{{}}}", comment.trim()));
                after_comment = true;
            }
        }
    }
    tokens.push(headers.result().to_string());

    out.push_str(&wrap(&tokens.join(" ")));
    out.push('\n');
    out
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn wrap(text: &str) -> String {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > LINE_WIDTH {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}
