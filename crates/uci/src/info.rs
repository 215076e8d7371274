//! Parsing of the engine's `info` lines.

/// Score in centipawns or mate distance, from the side to move's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawn score (100 = 1 pawn advantage).
    Cp(i32),
    /// Mate in N moves (positive = side to move mates, negative = gets mated).
    Mate(i32),
}

/// Marks a score reported during a fail-high or fail-low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBound {
    Lower,
    Upper,
}

/// One `info` line as reported during a search.
///
/// Fields the line does not mention stay `None`; unknown keywords are
/// skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineInfo {
    pub depth: Option<u32>,
    pub seldepth: Option<u32>,
    /// Line index for multi-PV searches (1-based).
    pub multipv: Option<u32>,
    pub score: Option<Score>,
    /// Set when the score is only a bound.
    pub bound: Option<ScoreBound>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
    /// Search time in milliseconds.
    pub time: Option<u64>,
    /// Principal variation, best move first.
    pub pv: Vec<String>,
    /// Hash table usage (per mille).
    pub hashfull: Option<u32>,
    /// Free text after `string`, up to the end of the line.
    pub string: Option<String>,
}

impl EngineInfo {
    /// Parses an `info` line. Returns `None` for any other line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace().peekable();
        if tokens.next() != Some("info") {
            return None;
        }

        let mut info = EngineInfo::default();
        while let Some(keyword) = tokens.next() {
            match keyword {
                "depth" => info.depth = number(tokens.next()),
                "seldepth" => info.seldepth = number(tokens.next()),
                "multipv" => info.multipv = number(tokens.next()),
                "nodes" => info.nodes = number(tokens.next()),
                "nps" => info.nps = number(tokens.next()),
                "time" => info.time = number(tokens.next()),
                "hashfull" => info.hashfull = number(tokens.next()),
                "lowerbound" => info.bound = Some(ScoreBound::Lower),
                "upperbound" => info.bound = Some(ScoreBound::Upper),
                "score" => {
                    info.score = match (tokens.next(), number(tokens.next())) {
                        (Some("cp"), Some(cp)) => Some(Score::Cp(cp)),
                        (Some("mate"), Some(m)) => Some(Score::Mate(m)),
                        _ => info.score,
                    };
                }
                "pv" => {
                    while let Some(mv) = tokens.next_if(|t| !is_info_keyword(t)) {
                        info.pv.push(mv.to_string());
                    }
                }
                "string" => {
                    info.string = Some(tokens.by_ref().collect::<Vec<_>>().join(" "));
                }
                _ => {}
            }
        }

        Some(info)
    }
}

fn number<T: std::str::FromStr>(token: Option<&str>) -> Option<T> {
    token.and_then(|t| t.parse().ok())
}

fn is_info_keyword(s: &str) -> bool {
    matches!(
        s,
        "depth" | "seldepth" | "multipv" | "score" | "lowerbound" | "upperbound"
        | "nodes" | "nps" | "time" | "pv" | "currmove" | "currmovenumber"
        | "hashfull" | "string" | "tbhits" | "cpuload" | "refutation" | "currline"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_info() {
        let line = "info depth 12 score cp 30 nodes 125000 nps 500000 pv e2e4 e7e5 g1f3";
        let info = EngineInfo::parse(line).unwrap();

        assert_eq!(info.depth, Some(12));
        assert_eq!(info.score, Some(Score::Cp(30)));
        assert_eq!(info.nodes, Some(125000));
        assert_eq!(info.nps, Some(500000));
        assert_eq!(info.pv, vec!["e2e4", "e7e5", "g1f3"]);
    }

    #[test]
    fn parse_mate_score() {
        let info = EngineInfo::parse("info depth 20 score mate -3 pv e2e4").unwrap();
        assert_eq!(info.score, Some(Score::Mate(-3)));
    }

    #[test]
    fn parse_multipv_line() {
        let line = "info depth 18 seldepth 24 multipv 2 score cp -15 nodes 900 nps 1000 tbhits 0 time 90 pv d2d4 d7d5";
        let info = EngineInfo::parse(line).unwrap();

        assert_eq!(info.multipv, Some(2));
        assert_eq!(info.seldepth, Some(24));
        assert_eq!(info.time, Some(90));
        assert_eq!(info.score, Some(Score::Cp(-15)));
        assert_eq!(info.bound, None);
        assert_eq!(info.pv, vec!["d2d4", "d7d5"]);
    }

    #[test]
    fn pv_stops_at_next_keyword() {
        let info = EngineInfo::parse("info pv e2e4 e7e5 hashfull 12").unwrap();
        assert_eq!(info.pv, vec!["e2e4", "e7e5"]);
        assert_eq!(info.hashfull, Some(12));
    }

    #[test]
    fn parse_bound_flags() {
        let info = EngineInfo::parse("info depth 9 score cp 41 lowerbound nodes 10").unwrap();
        assert_eq!(info.bound, Some(ScoreBound::Lower));
        assert_eq!(info.nodes, Some(10));

        let info = EngineInfo::parse("info depth 9 score cp 41 upperbound").unwrap();
        assert_eq!(info.bound, Some(ScoreBound::Upper));
    }

    #[test]
    fn parse_string_info() {
        let info = EngineInfo::parse("info string NNUE evaluation enabled").unwrap();
        assert_eq!(info.string.as_deref(), Some("NNUE evaluation enabled"));
    }

    #[test]
    fn currmove_lines_carry_no_score() {
        let info = EngineInfo::parse("info depth 21 currmove g1f3 currmovenumber 4").unwrap();
        assert_eq!(info.depth, Some(21));
        assert_eq!(info.score, None);
        assert!(info.pv.is_empty());
    }

    #[test]
    fn non_info_line_is_rejected() {
        assert!(EngineInfo::parse("bestmove e2e4").is_none());
        assert!(EngineInfo::parse("information").is_none());
    }
}
