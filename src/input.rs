use super::*;
use crate::error::{OracleError, Result};
use crate::graph::{EdgeWriter, Graph};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, error, warn};

/// Reads a graph file; a file that cannot be opened yields an empty graph.
pub fn read_graph(path: impl AsRef<Path>) -> Result<Graph> {
    let path = path.as_ref();
    match File::open(path) {
        Ok(file) => parse_graph(file),
        Err(err) => {
            error!("Could not open input file {}: {}", path.display(), err);
            Ok(Graph::default())
        }
    }
}

/// Reads an opinion file; a file that cannot be opened yields no opinions.
pub fn read_opinions(path: impl AsRef<Path>) -> Result<Vec<f64>> {
    let path = path.as_ref();
    match File::open(path) {
        Ok(file) => parse_opinions(file),
        Err(err) => {
            error!("Could not open input file {}: {}", path.display(), err);
            Ok(Vec::new())
        }
    }
}

/// Parses `n` followed by whitespace separated `u v weight` triples.
///
/// Parsing stops silently at the first incomplete or malformed triple. Vertex
/// ids outside `[0, n)` are rejected, however many digits they have.
pub fn parse_graph(reader: impl Read) -> Result<Graph> {
    let mut tokens = Tokens::new(BufReader::new(reader));

    let num_nodes = match tokens.next_parsed::<Node>()? {
        Token::Value(n) => n,
        Token::Stop(_) => {
            warn!("Graph input does not start with a vertex count");
            return Ok(Graph::default());
        }
    };

    let mut graph = Graph::new(num_nodes);
    loop {
        match next_edge(&mut tokens, num_nodes)? {
            Token::Value((u, v, weight)) => graph.add_edge(u, v, weight)?,
            Token::Stop(Stop::Malformed) => {
                debug!(
                    "Stopped reading graph at a malformed triple after {} edges",
                    graph.num_edges()
                );
                break;
            }
            Token::Stop(Stop::End) => break,
        }
    }

    debug!(
        "Read graph with {} vertices and {} edges",
        graph.num_nodes(),
        graph.num_edges()
    );

    Ok(graph)
}

/// Parses whitespace separated opinions up to the first malformed token.
pub fn parse_opinions(reader: impl Read) -> Result<Vec<f64>> {
    let mut tokens = Tokens::new(BufReader::new(reader));
    let mut opinions = Vec::new();

    loop {
        match tokens.next_parsed::<f64>()? {
            Token::Value(opinion) => opinions.push(opinion),
            Token::Stop(Stop::Malformed) => {
                debug!("Stopped reading opinions at a malformed token");
                break;
            }
            Token::Stop(Stop::End) => break,
        }
    }

    debug!("Read {} opinions", opinions.len());
    Ok(opinions)
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Stop {
    Malformed,
    End,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Token<T> {
    Value(T),
    Stop(Stop),
}

/// ASCII-whitespace separated tokens read straight from the byte stream.
struct Tokens<R> {
    reader: R,
    token: Vec<u8>,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            token: Vec::with_capacity(32),
        }
    }

    fn next_token(&mut self) -> std::io::Result<Option<&[u8]>> {
        self.token.clear();

        loop {
            let buffer = self.reader.fill_buf()?;
            if buffer.is_empty() {
                break;
            }

            let mut used = 0;
            let mut complete = false;
            for &byte in buffer {
                used += 1;
                if !byte.is_ascii_whitespace() {
                    self.token.push(byte);
                } else if !self.token.is_empty() {
                    complete = true;
                    break;
                }
            }

            self.reader.consume(used);
            if complete {
                break;
            }
        }

        if self.token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(&self.token))
        }
    }

    fn next_str(&mut self) -> std::io::Result<Token<&str>> {
        Ok(match self.next_token()? {
            None => Token::Stop(Stop::End),
            Some(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => Token::Value(text),
                Err(_) => Token::Stop(Stop::Malformed),
            },
        })
    }

    fn next_parsed<T: FromStr>(&mut self) -> std::io::Result<Token<T>> {
        Ok(match self.next_str()? {
            Token::Value(text) => match text.parse() {
                Ok(value) => Token::Value(value),
                Err(_) => Token::Stop(Stop::Malformed),
            },
            Token::Stop(stop) => Token::Stop(stop),
        })
    }

    fn next_vertex(&mut self, num_nodes: Node) -> Result<Token<Node>> {
        let text = match self.next_str()? {
            Token::Value(text) => text,
            Token::Stop(stop) => return Ok(Token::Stop(stop)),
        };

        let id = match text.parse::<i128>() {
            Ok(id) => id,
            Err(_) if is_integer_literal(text) => {
                let id = if text.starts_with('-') {
                    i128::MIN
                } else {
                    i128::MAX
                };
                return Err(OracleError::out_of_range(id, num_nodes));
            }
            Err(_) => return Ok(Token::Stop(Stop::Malformed)),
        };

        match Node::try_from(id) {
            Ok(u) if u < num_nodes => Ok(Token::Value(u)),
            _ => Err(OracleError::out_of_range(id, num_nodes)),
        }
    }
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix(|c| c == '-' || c == '+').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn next_edge<R: BufRead>(
    tokens: &mut Tokens<R>,
    num_nodes: Node,
) -> Result<Token<(Node, Node, f64)>> {
    let u = match tokens.next_vertex(num_nodes)? {
        Token::Value(u) => u,
        Token::Stop(stop) => return Ok(Token::Stop(stop)),
    };
    let v = match tokens.next_vertex(num_nodes)? {
        Token::Value(v) => v,
        Token::Stop(stop) => return Ok(Token::Stop(stop)),
    };
    let weight = match tokens.next_parsed::<f64>()? {
        Token::Value(weight) => weight,
        Token::Stop(stop) => return Ok(Token::Stop(stop)),
    };

    Ok(Token::Value((u, v, weight)))
}
