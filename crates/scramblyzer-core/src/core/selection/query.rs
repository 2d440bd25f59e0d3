use crate::core::io::ndx::IndexGroups;
use crate::core::models::atom::Atom;
use crate::core::models::system::MolecularSystem;
use crate::core::utils::pattern::NamePattern;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Selection query is empty")]
    Empty,
    #[error("Unexpected token '{0}' in selection query")]
    UnexpectedToken(String),
    #[error("Selection query ended unexpectedly")]
    UnexpectedEnd,
    #[error("Keyword '{0}' requires at least one value")]
    MissingValue(String),
    #[error("Invalid number or range '{0}'")]
    InvalidRange(String),
    #[error("Unterminated quoted group name")]
    UnterminatedQuote,
    #[error("Index group '{0}' does not exist")]
    UnknownGroup(String),
}

/// Inclusive range of residue or atom numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberRange {
    pub start: isize,
    pub end: isize,
}

impl NumberRange {
    pub fn contains(&self, value: isize) -> bool {
        value >= self.start && value <= self.end
    }
}

impl FromStr for NumberRange {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || QueryError::InvalidRange(s.to_string());
        // A leading '-' belongs to the first number, not to the range.
        let split = s
            .char_indices()
            .skip(1)
            .find(|&(_, c)| c == '-')
            .map(|(i, _)| i);

        let (start, end) = match split {
            Some(i) => (
                s[..i].parse().map_err(|_| invalid())?,
                s[i + 1..].parse().map_err(|_| invalid())?,
            ),
            None => {
                let value = s.parse().map_err(|_| invalid())?;
                (value, value)
            }
        };

        if start > end {
            return Err(invalid());
        }
        Ok(Self { start, end })
    }
}

/// A parsed atom selection expression.
///
/// ```text
/// query   := or
/// or      := and (("or" | "||") and)*
/// and     := unary (("and" | "&&") unary)*
/// unary   := ("not" | "!") unary | primary
/// primary := "(" query ")" | "all"
///          | ("name" | "resname") PATTERN+
///          | ("resid" | "serial") RANGE+
///          | GROUP
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum AtomQuery {
    All,
    Name(Vec<NamePattern>),
    ResidueName(Vec<NamePattern>),
    ResidueNumber(Vec<NumberRange>),
    Serial(Vec<NumberRange>),
    Group(String),
    Not(Box<AtomQuery>),
    And(Box<AtomQuery>, Box<AtomQuery>),
    Or(Box<AtomQuery>, Box<AtomQuery>),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Word(String),
    Quoted(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::And => write!(f, "and"),
            Token::Or => write!(f, "or"),
            Token::Not => write!(f, "not"),
            Token::Word(word) => write!(f, "{}", word),
            Token::Quoted(word) => write!(f, "\"{}\"", word),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, QueryError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '!' => {
                chars.next();
                tokens.push(Token::Not);
            }
            '&' | '|' => {
                chars.next();
                if chars.next_if_eq(&c).is_none() {
                    return Err(QueryError::UnexpectedToken(c.to_string()));
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            '"' => {
                chars.next();
                let mut word = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(ch) => word.push(ch),
                        None => return Err(QueryError::UnterminatedQuote),
                    }
                }
                tokens.push(Token::Quoted(word));
            }
            _ => {
                let mut word = String::new();
                while let Some(ch) =
                    chars.next_if(|ch| !ch.is_whitespace() && !"()\"&|".contains(*ch))
                {
                    word.push(ch);
                }
                tokens.push(match word.to_ascii_lowercase().as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    _ => Token::Word(word),
                });
            }
        }
    }

    Ok(tokens)
}

const KEYWORDS: [&str; 5] = ["all", "name", "resname", "resid", "serial"];

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_or(&mut self) -> Result<AtomQuery, QueryError> {
        let mut lhs = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = AtomQuery::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<AtomQuery, QueryError> {
        let mut lhs = self.parse_unary()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = AtomQuery::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<AtomQuery, QueryError> {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(AtomQuery::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<AtomQuery, QueryError> {
        match self.advance().ok_or(QueryError::UnexpectedEnd)? {
            Token::LParen => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    Some(other) => Err(QueryError::UnexpectedToken(other.to_string())),
                    None => Err(QueryError::UnexpectedEnd),
                }
            }
            Token::Quoted(group) => Ok(AtomQuery::Group(group)),
            Token::Word(word) => match word.to_ascii_lowercase().as_str() {
                "all" => Ok(AtomQuery::All),
                "name" => Ok(AtomQuery::Name(self.patterns(&word)?)),
                "resname" => Ok(AtomQuery::ResidueName(self.patterns(&word)?)),
                "resid" => Ok(AtomQuery::ResidueNumber(self.ranges(&word)?)),
                "serial" => Ok(AtomQuery::Serial(self.ranges(&word)?)),
                _ => Ok(AtomQuery::Group(word)),
            },
            other => Err(QueryError::UnexpectedToken(other.to_string())),
        }
    }

    /// Collects the value words following a keyword.
    fn values(&mut self, keyword: &str) -> Result<Vec<String>, QueryError> {
        let mut values = Vec::new();
        while let Some(Token::Word(word)) = self.peek() {
            if KEYWORDS.contains(&word.to_ascii_lowercase().as_str()) {
                break;
            }
            values.push(word.clone());
            self.advance();
        }
        if values.is_empty() {
            return Err(QueryError::MissingValue(keyword.to_string()));
        }
        Ok(values)
    }

    fn patterns(&mut self, keyword: &str) -> Result<Vec<NamePattern>, QueryError> {
        Ok(self
            .values(keyword)?
            .iter()
            .map(|value| NamePattern::new(value))
            .collect())
    }

    fn ranges(&mut self, keyword: &str) -> Result<Vec<NumberRange>, QueryError> {
        self.values(keyword)?
            .iter()
            .map(|value| value.parse())
            .collect()
    }
}

impl AtomQuery {
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(QueryError::Empty);
        }

        let mut parser = Parser { tokens, pos: 0 };
        let query = parser.parse_or()?;
        match parser.advance() {
            None => Ok(query),
            Some(token) => Err(QueryError::UnexpectedToken(token.to_string())),
        }
    }

    /// Selects the indices of all atoms in `system` matching this query.
    ///
    /// Index groups are only needed when the query names a group.
    ///
    /// # Return
    ///
    /// Returns zero-based atom indices in ascending order, without duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownGroup`] if a referenced group is not available.
    pub fn select(
        &self,
        system: &MolecularSystem,
        groups: Option<&IndexGroups>,
    ) -> Result<Vec<usize>, QueryError> {
        let mask = self.mask(system, groups)?;
        Ok(mask
            .iter()
            .enumerate()
            .filter_map(|(i, &selected)| selected.then_some(i))
            .collect())
    }

    fn mask(
        &self,
        system: &MolecularSystem,
        groups: Option<&IndexGroups>,
    ) -> Result<Vec<bool>, QueryError> {
        let mask = match self {
            AtomQuery::All => vec![true; system.atom_count()],
            AtomQuery::Name(patterns) => {
                atom_mask(system, |atom: &Atom| patterns.iter().any(|p| p.matches(&atom.name)))
            }
            AtomQuery::ResidueName(patterns) => {
                atom_mask(system, |atom: &Atom| patterns.iter().any(|p| p.matches(&atom.residue_name)))
            }
            AtomQuery::ResidueNumber(ranges) => {
                atom_mask(system, |atom: &Atom| ranges.iter().any(|r| r.contains(atom.residue_number)))
            }
            AtomQuery::Serial(ranges) => atom_mask(system, |atom: &Atom| {
                let serial = atom.serial as isize;
                ranges.iter().any(|r| r.contains(serial))
            }),
            AtomQuery::Group(name) => {
                let indices = groups
                    .and_then(|groups| groups.get(name))
                    .ok_or_else(|| QueryError::UnknownGroup(name.clone()))?;
                let mut mask = vec![false; system.atom_count()];
                for &i in indices {
                    if let Some(slot) = mask.get_mut(i) {
                        *slot = true;
                    }
                }
                mask
            }
            AtomQuery::Not(inner) => {
                let mut mask = inner.mask(system, groups)?;
                mask.iter_mut().for_each(|m| *m = !*m);
                mask
            }
            AtomQuery::And(lhs, rhs) => {
                let left = lhs.mask(system, groups)?;
                let right = rhs.mask(system, groups)?;
                left.iter().zip(&right).map(|(a, b)| *a && *b).collect()
            }
            AtomQuery::Or(lhs, rhs) => {
                let left = lhs.mask(system, groups)?;
                let right = rhs.mask(system, groups)?;
                left.iter().zip(&right).map(|(a, b)| *a || *b).collect()
            }
        };
        Ok(mask)
    }
}

fn atom_mask(system: &MolecularSystem, predicate: impl Fn(&Atom) -> bool) -> Vec<bool> {
    system.atoms().iter().map(predicate).collect()
}

impl FromStr for AtomQuery {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AtomQuery::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::simbox::SimBox;
    use nalgebra::Point3;
    use std::io::Cursor;

    fn system() -> MolecularSystem {
        let atoms = vec![
            Atom::new(1, "NC3", "POPC", 1, Point3::origin()),
            Atom::new(2, "PO4", "POPC", 1, Point3::origin()),
            Atom::new(3, "C1A", "POPC", 1, Point3::origin()),
            Atom::new(4, "PO4", "POPE", 2, Point3::origin()),
            Atom::new(5, "NH3", "POPE", 2, Point3::origin()),
            Atom::new(6, "W", "W", 3, Point3::origin()),
        ];
        MolecularSystem::new("test", atoms, SimBox::new(5.0, 5.0, 10.0))
    }

    fn select(query: &str) -> Vec<usize> {
        AtomQuery::parse(query)
            .unwrap()
            .select(&system(), None)
            .unwrap()
    }

    #[test]
    fn parse_builds_expected_tree_with_precedence() {
        let query = AtomQuery::parse("name PO4 or resname W and not resid 3").unwrap();
        let expected = AtomQuery::Or(
            Box::new(AtomQuery::Name(vec![NamePattern::new("PO4")])),
            Box::new(AtomQuery::And(
                Box::new(AtomQuery::ResidueName(vec![NamePattern::new("W")])),
                Box::new(AtomQuery::Not(Box::new(AtomQuery::ResidueNumber(vec![
                    NumberRange { start: 3, end: 3 },
                ])))),
            )),
        );
        assert_eq!(query, expected);
    }

    #[test]
    fn select_by_name_resname_and_multiple_values() {
        assert_eq!(select("name PO4"), vec![1, 3]);
        assert_eq!(select("resname POPE"), vec![3, 4]);
        assert_eq!(select("name NC3 NH3"), vec![0, 4]);
        assert_eq!(select("name PO*"), vec![1, 3]);
        assert_eq!(select("resname POP?"), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn select_by_number_ranges() {
        assert_eq!(select("resid 2-3"), vec![3, 4, 5]);
        assert_eq!(select("serial 1 5-6"), vec![0, 4, 5]);
    }

    #[test]
    fn select_with_boolean_operators_and_parentheses() {
        assert_eq!(select("resname POPC && name PO4"), vec![1]);
        assert_eq!(select("name W || name NC3"), vec![0, 5]);
        assert_eq!(select("!(resname POPC or resname POPE)"), vec![5]);
        assert_eq!(select("not all"), Vec::<usize>::new());
        assert_eq!(
            select("(name PO4 or name NH3) and resname POPE"),
            vec![3, 4]
        );
    }

    #[test]
    fn select_resolves_index_groups() {
        let ndx = "[ Heads ]\n2 4\n[ My Group ]\n6\n";
        let groups = IndexGroups::read_from(&mut Cursor::new(ndx), 6).unwrap();
        let sys = system();

        let heads = AtomQuery::parse("Heads").unwrap();
        assert_eq!(heads.select(&sys, Some(&groups)).unwrap(), vec![1, 3]);

        let quoted = AtomQuery::parse("\"My Group\" or Heads").unwrap();
        assert_eq!(quoted.select(&sys, Some(&groups)).unwrap(), vec![1, 3, 5]);
    }

    #[test]
    fn select_fails_for_unknown_group() {
        let query = AtomQuery::parse("Membrane").unwrap();
        assert_eq!(
            query.select(&system(), None),
            Err(QueryError::UnknownGroup("Membrane".to_string()))
        );
    }

    #[test]
    fn parse_rejects_malformed_queries() {
        assert_eq!(AtomQuery::parse("   "), Err(QueryError::Empty));
        assert_eq!(
            AtomQuery::parse("name"),
            Err(QueryError::MissingValue("name".to_string()))
        );
        assert_eq!(
            AtomQuery::parse("resid 5-2"),
            Err(QueryError::InvalidRange("5-2".to_string()))
        );
        assert_eq!(
            AtomQuery::parse("resid x"),
            Err(QueryError::InvalidRange("x".to_string()))
        );
        assert_eq!(AtomQuery::parse("(name PO4"), Err(QueryError::UnexpectedEnd));
        assert_eq!(
            AtomQuery::parse("name PO4)"),
            Err(QueryError::UnexpectedToken(")".to_string()))
        );
        assert_eq!(
            AtomQuery::parse("name PO4 & name W"),
            Err(QueryError::UnexpectedToken("&".to_string()))
        );
        assert_eq!(
            AtomQuery::parse("\"open group"),
            Err(QueryError::UnterminatedQuote)
        );
    }

    #[test]
    fn number_range_accepts_negative_values() {
        assert_eq!(
            "-3--1".parse::<NumberRange>(),
            Ok(NumberRange { start: -3, end: -1 })
        );
        assert_eq!(
            "-2".parse::<NumberRange>(),
            Ok(NumberRange { start: -2, end: -2 })
        );
    }

    #[test]
    fn from_str_delegates_to_parse() {
        let query: AtomQuery = "all".parse().unwrap();
        assert_eq!(query, AtomQuery::All);
    }
}
