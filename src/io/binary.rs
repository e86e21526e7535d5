//! Binary graph format: a `u32` vertex count, a `u32` edge count, then that
//! many 12-byte `(u, v, weight)` records. All integers are in host byte
//! order and there is no padding.

use crate::graph::edge::Edge;
use crate::mst_error::MstError;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

/// Counts stored at the start of a graph file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphHeader {
    pub n_verts: u32,
    pub n_edges: u32,
}

impl GraphHeader {
    pub const SIZE: usize = 8;

    fn read_from<R: Read>(reader: &mut R) -> Result<Self, MstError> {
        let mut verts = [0u8; 4];
        let mut edges = [0u8; 4];
        reader.read_exact(&mut verts)?;
        reader.read_exact(&mut edges)?;
        Ok(Self {
            n_verts: u32::from_ne_bytes(verts),
            n_edges: u32::from_ne_bytes(edges),
        })
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), MstError> {
        writer.write_all(&self.n_verts.to_ne_bytes())?;
        writer.write_all(&self.n_edges.to_ne_bytes())?;
        Ok(())
    }
}

/// Streaming reader yielding one edge at a time.
///
/// Each edge is checked against the header's vertex count; a body shorter
/// than the header's edge count ends the stream with
/// [`MstError::TruncatedInput`].
#[derive(Debug)]
pub struct EdgeReader<R> {
    reader: R,
    header: GraphHeader,
    read: u32,
}

impl EdgeReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MstError> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read> EdgeReader<R> {
    /// Read the header and position the stream at the first edge.
    pub fn new(mut reader: R) -> Result<Self, MstError> {
        let header = GraphHeader::read_from(&mut reader)?;
        log::debug!(
            "graph header: {} vertices, {} edges",
            header.n_verts,
            header.n_edges
        );
        Ok(Self {
            reader,
            header,
            read: 0,
        })
    }

    #[inline]
    pub fn header(&self) -> GraphHeader {
        self.header
    }
}

impl<R: Read> Iterator for EdgeReader<R> {
    type Item = Result<Edge, MstError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.read >= self.header.n_edges {
            return None;
        }
        let mut buf = [0u8; Edge::SIZE];
        if let Err(err) = self.reader.read_exact(&mut buf) {
            let found = self.read;
            self.read = self.header.n_edges;
            return Some(Err(match err.kind() {
                ErrorKind::UnexpectedEof => MstError::TruncatedInput {
                    expected: self.header.n_edges,
                    found,
                },
                _ => MstError::Io(err),
            }));
        }
        self.read += 1;
        let e: Edge = bytemuck::pod_read_unaligned(&buf);
        if e.u >= self.header.n_verts || e.v >= self.header.n_verts {
            return Some(Err(MstError::VertexOutOfRange {
                u: e.u,
                v: e.v,
                n_verts: self.header.n_verts,
            }));
        }
        Some(Ok(e))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.header.n_edges - self.read) as usize;
        (0, Some(left))
    }
}

/// Read a whole graph into memory.
pub fn read_graph<R: Read>(reader: R) -> Result<(GraphHeader, Vec<Edge>), MstError> {
    let edges = EdgeReader::new(reader)?;
    let header = edges.header();
    let edges = edges.collect::<Result<Vec<_>, _>>()?;
    Ok((header, edges))
}

/// Write `edges` over `n_verts` vertices in the binary format.
pub fn write_graph<W: Write>(writer: W, n_verts: u32, edges: &[Edge]) -> Result<(), MstError> {
    let mut writer = BufWriter::new(writer);
    let header = GraphHeader {
        n_verts,
        n_edges: edges.len() as u32,
    };
    header.write_to(&mut writer)?;
    writer.write_all(bytemuck::cast_slice(edges))?;
    writer.flush()?;
    Ok(())
}

pub fn write_graph_file(
    path: impl AsRef<Path>,
    n_verts: u32,
    edges: &[Edge],
) -> Result<(), MstError> {
    write_graph(File::create(path.as_ref())?, n_verts, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(n_verts: u32, edges: &[Edge]) -> Vec<u8> {
        let mut out = Vec::new();
        write_graph(&mut out, n_verts, edges).unwrap();
        out
    }

    #[test]
    fn header_then_records() {
        let bytes = encode(4, &[Edge::new(0, 1, 1), Edge::new(2, 3, 3)]);
        assert_eq!(bytes.len(), GraphHeader::SIZE + 2 * Edge::SIZE);
        assert_eq!(&bytes[0..4], &4u32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &2u32.to_ne_bytes());
        let (header, edges) = read_graph(Cursor::new(bytes)).unwrap();
        assert_eq!(header, GraphHeader { n_verts: 4, n_edges: 2 });
        assert_eq!(edges[1], Edge::new(2, 3, 3));
    }

    #[test]
    fn truncated_body() {
        let mut bytes = encode(4, &[Edge::new(0, 1, 1), Edge::new(2, 3, 3)]);
        bytes.truncate(bytes.len() - 5);
        let mut reader = EdgeReader::new(Cursor::new(bytes)).unwrap();
        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(err, MstError::TruncatedInput { expected: 2, found: 1 }));
        assert!(reader.next().is_none());
    }

    #[test]
    fn vertex_outside_header_range() {
        let bytes = encode(3, &[Edge::new(0, 3, 1)]);
        let err = read_graph(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, MstError::VertexOutOfRange { u: 0, v: 3, n_verts: 3 }));
    }

    #[test]
    fn short_header_is_io_error() {
        let err = EdgeReader::new(Cursor::new(vec![1u8, 2, 3])).unwrap_err();
        assert!(matches!(err, MstError::Io(_)));
    }
}
