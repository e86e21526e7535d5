//! Text-to-binary graph conversion for preparing test inputs.
//!
//! The text form is whitespace separated: `n_verts n_edges` followed by
//! `n_edges` triples `u v weight`. Line breaks carry no meaning.

use crate::graph::edge::Edge;
use crate::io::binary::{GraphHeader, write_graph};
use crate::mst_error::MstError;
use std::io::{BufRead, Lines, Write};

/// Whitespace tokenizer over a line stream that remembers token positions.
struct Tokens<R> {
    lines: Lines<R>,
    pending: std::vec::IntoIter<String>,
    position: usize,
}

impl<R: BufRead> Tokens<R> {
    fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
            pending: Vec::new().into_iter(),
            position: 0,
        }
    }

    fn next_u32(&mut self, what: &str) -> Result<u32, MstError> {
        let token = loop {
            if let Some(tok) = self.pending.next() {
                break tok;
            }
            match self.lines.next() {
                Some(line) => {
                    let line = line?;
                    self.pending = line
                        .split_whitespace()
                        .map(str::to_owned)
                        .collect::<Vec<_>>()
                        .into_iter();
                }
                None => {
                    return Err(MstError::Parse {
                        position: self.position,
                        reason: format!("unexpected end of input, expected {what}"),
                    });
                }
            }
        };
        let position = self.position;
        self.position += 1;
        token.parse::<u32>().map_err(|e| MstError::Parse {
            position,
            reason: format!("{what} `{token}`: {e}"),
        })
    }
}

/// Parse the text form into a header and an edge list.
pub fn parse_ascii<R: BufRead>(input: R) -> Result<(GraphHeader, Vec<Edge>), MstError> {
    let mut tokens = Tokens::new(input);
    let n_verts = tokens.next_u32("vertex count")?;
    let n_edges = tokens.next_u32("edge count")?;
    let mut edges = Vec::with_capacity(n_edges.min(1 << 20) as usize);
    for _ in 0..n_edges {
        let u = tokens.next_u32("source vertex")?;
        let v = tokens.next_u32("target vertex")?;
        let weight = tokens.next_u32("weight")?;
        edges.push(Edge::new(u, v, weight));
    }
    Ok((GraphHeader { n_verts, n_edges }, edges))
}

/// Convert the text form read from `input` into the binary form on `output`.
pub fn convert_ascii<R: BufRead, W: Write>(input: R, output: W) -> Result<GraphHeader, MstError> {
    let (header, edges) = parse_ascii(input)?;
    write_graph(output, header.n_verts, &edges)?;
    log::info!(
        "converted graph with {} vertices and {} edges",
        header.n_verts,
        header.n_edges
    );
    Ok(header)
}
