//! Tessellation dump format reader and writer.
//!
//! A dump is a plain-text file with labeled sections. A Delaunay dump
//! holds `# Vertices #` followed by `# Triangles #`; a Voronoi dump holds
//! `# Vertices #`, `# Cells #` and optionally `# Centroids #`. Records are
//! one per line, `<index>\t(<field>, <field>, ...)`, where the declared
//! index picks the record's slot in the output table. Records may appear
//! out of file order but must densely cover `0..n-1`.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use voroscope_core::tessellation::{Cell, CellDiagram, InvalidReference, Triangle, Triangulation};
use voroscope_core::Point;

/// Marker line opening the vertex section.
pub const VERTICES_MARKER: &str = "# Vertices #";
/// Marker line opening the triangle section of a Delaunay dump.
pub const TRIANGLES_MARKER: &str = "# Triangles #";
/// Marker line opening the cell section of a Voronoi dump.
pub const CELLS_MARKER: &str = "# Cells #";
/// Marker line opening the optional centroid section of a Voronoi dump.
pub const CENTROIDS_MARKER: &str = "# Centroids #";

// ── Errors ────────────────────────────────────────────────────────────

/// Errors produced while reading or writing a dump. A dump is one atomic
/// unit: the first defect aborts the whole parse, there is no partial
/// success and no best-effort repair.
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("missing section marker {marker:?}")]
    MissingSection { marker: &'static str },

    #[error("line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("line {line}: duplicate record index {index}")]
    DuplicateIndex { line: usize, index: usize },

    #[error("line {line}: record index {index} out of range for {count} records")]
    IndexOutOfRange {
        line: usize,
        index: usize,
        count: usize,
    },

    #[error("no record declares index {index} ({count} records in section)")]
    MissingIndex { index: usize, count: usize },

    #[error(transparent)]
    Reference(#[from] InvalidReference),
}

fn format_err(line: usize, message: impl Into<String>) -> DumpError {
    DumpError::Format {
        line,
        message: message.into(),
    }
}

// ── Reader ────────────────────────────────────────────────────────────

/// Reads a tessellation dump from any buffered source.
pub struct DumpReader<R> {
    reader: R,
}

impl DumpReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DumpError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> DumpReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read a Delaunay dump: a vertex section followed by a triangle
    /// section running to end of file.
    pub fn read_triangulation(self) -> Result<Triangulation, DumpError> {
        let lines = self.read_lines()?;
        let body = section_after(&lines, VERTICES_MARKER)?;
        let (vertex_lines, triangle_lines) = split_at_marker(body, TRIANGLES_MARKER)?;

        let vertices = parse_points(vertex_lines)?;
        let triangles = parse_triangles(triangle_lines)?;

        let triangulation = Triangulation::new(vertices, triangles);
        triangulation.validate()?;
        log::info!(
            "parsed {} vertices and {} triangles",
            triangulation.vertex_count(),
            triangulation.triangle_count()
        );
        Ok(triangulation)
    }

    /// Read a Voronoi dump: a vertex section, a cell section, and an
    /// optional centroid section reusing the point record grammar.
    pub fn read_cell_diagram(self) -> Result<CellDiagram, DumpError> {
        let lines = self.read_lines()?;
        let body = section_after(&lines, VERTICES_MARKER)?;
        let (vertex_lines, rest) = split_at_marker(body, CELLS_MARKER)?;
        let (cell_lines, centroid_lines) = split_at_marker_opt(rest, CENTROIDS_MARKER);

        let vertices = parse_points(vertex_lines)?;
        let cells = parse_cells(cell_lines)?;
        let centroids = match centroid_lines {
            Some(lines) => parse_points(lines)?,
            None => Vec::new(),
        };

        let diagram = CellDiagram::new(vertices, cells, centroids);
        diagram.validate()?;
        log::info!(
            "parsed {} vertices, {} cells, {} centroids",
            diagram.vertex_count(),
            diagram.cell_count(),
            diagram.centroids.len()
        );
        Ok(diagram)
    }

    fn read_lines(self) -> Result<Vec<(usize, String)>, DumpError> {
        let mut lines = Vec::new();
        for (i, line) in self.reader.lines().enumerate() {
            lines.push((i + 1, line?));
        }
        Ok(lines)
    }
}

type NumberedLines = [(usize, String)];

/// Everything after the last occurrence of `marker`; earlier content is
/// discarded, matching the producers which may prepend arbitrary notes.
fn section_after<'a>(
    lines: &'a NumberedLines,
    marker: &'static str,
) -> Result<&'a NumberedLines, DumpError> {
    let pos = lines
        .iter()
        .rposition(|(_, l)| l == marker)
        .ok_or(DumpError::MissingSection { marker })?;
    Ok(&lines[pos + 1..])
}

fn split_at_marker<'a>(
    lines: &'a NumberedLines,
    marker: &'static str,
) -> Result<(&'a NumberedLines, &'a NumberedLines), DumpError> {
    let pos = lines
        .iter()
        .position(|(_, l)| l == marker)
        .ok_or(DumpError::MissingSection { marker })?;
    Ok((&lines[..pos], &lines[pos + 1..]))
}

fn split_at_marker_opt<'a>(
    lines: &'a NumberedLines,
    marker: &'static str,
) -> (&'a NumberedLines, Option<&'a NumberedLines>) {
    match lines.iter().position(|(_, l)| l == marker) {
        Some(pos) => (&lines[..pos], Some(&lines[pos + 1..])),
        None => (lines, None),
    }
}

// ── Record grammar ────────────────────────────────────────────────────

/// Split `<index>\t(<body>)` and parse the declared index. The grammar is
/// strict: exactly one tab, fields parenthesized, no stray whitespace.
fn record_parts(line: &str, line_no: usize) -> Result<(usize, &str), DumpError> {
    let (index, rest) = line
        .split_once('\t')
        .ok_or_else(|| format_err(line_no, "expected <index><TAB>(<fields>)"))?;
    let index: usize = index
        .parse()
        .map_err(|_| format_err(line_no, format!("invalid record index {index:?}")))?;
    let body = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| format_err(line_no, "record fields must be parenthesized"))?;
    Ok((index, body))
}

fn parse_coordinate(field: &str, line_no: usize) -> Result<f64, DumpError> {
    field
        .parse()
        .map_err(|_| format_err(line_no, format!("invalid coordinate {field:?}")))
}

fn parse_vertex_index(field: &str, line_no: usize) -> Result<usize, DumpError> {
    field
        .parse()
        .map_err(|_| format_err(line_no, format!("invalid vertex index {field:?}")))
}

fn parse_points(lines: &NumberedLines) -> Result<Vec<Point>, DumpError> {
    let mut records = Vec::new();
    for (line_no, line) in lines.iter().filter(|(_, l)| !l.is_empty()) {
        let (index, body) = record_parts(line, *line_no)?;
        let fields: Vec<&str> = body.split(", ").collect();
        if fields.len() != 2 {
            return Err(format_err(
                *line_no,
                format!("expected 2 coordinates, found {}", fields.len()),
            ));
        }
        let x = parse_coordinate(fields[0], *line_no)?;
        let y = parse_coordinate(fields[1], *line_no)?;
        records.push((*line_no, index, Point::new(x, y)));
    }
    into_dense(records)
}

fn parse_triangles(lines: &NumberedLines) -> Result<Vec<Triangle>, DumpError> {
    let mut records = Vec::new();
    for (line_no, line) in lines.iter().filter(|(_, l)| !l.is_empty()) {
        let (index, body) = record_parts(line, *line_no)?;
        let fields: Vec<&str> = body.split(", ").collect();
        if fields.len() != 3 {
            return Err(format_err(
                *line_no,
                format!("expected 3 vertex indices, found {}", fields.len()),
            ));
        }
        let a = parse_vertex_index(fields[0], *line_no)?;
        let b = parse_vertex_index(fields[1], *line_no)?;
        let c = parse_vertex_index(fields[2], *line_no)?;
        records.push((*line_no, index, Triangle::new(a, b, c)));
    }
    into_dense(records)
}

fn parse_cells(lines: &NumberedLines) -> Result<Vec<Cell>, DumpError> {
    let mut records = Vec::new();
    for (line_no, line) in lines.iter().filter(|(_, l)| !l.is_empty()) {
        let (index, body) = record_parts(line, *line_no)?;
        let fields: Vec<&str> = body.split(", ").collect();
        if fields.len() < 3 {
            return Err(format_err(
                *line_no,
                format!("a cell needs at least 3 vertex indices, found {}", fields.len()),
            ));
        }
        let vertices = fields
            .iter()
            .map(|f| parse_vertex_index(f, *line_no))
            .collect::<Result<Vec<_>, _>>()?;
        records.push((*line_no, index, Cell::new(vertices)));
    }
    into_dense(records)
}

/// Place each record into its declared slot of a table sized by the record
/// count, then verify full coverage. Gaps, duplicates and out-of-range
/// declarations are all fatal: an undefined row must never reach the
/// renderer.
fn into_dense<T>(records: Vec<(usize, usize, T)>) -> Result<Vec<T>, DumpError> {
    let count = records.len();
    let mut slots: Vec<Option<T>> = Vec::with_capacity(count);
    slots.resize_with(count, || None);

    for (line, index, value) in records {
        if index >= count {
            return Err(DumpError::IndexOutOfRange { line, index, count });
        }
        if slots[index].is_some() {
            return Err(DumpError::DuplicateIndex { line, index });
        }
        slots[index] = Some(value);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.ok_or(DumpError::MissingIndex { index, count }))
        .collect()
}

// ── Writer ────────────────────────────────────────────────────────────

/// Writes tessellation collections back out in the dump format, records
/// in index order. Coordinates use the shortest `f64` representation that
/// parses back bit-for-bit.
pub struct DumpWriter<W: Write> {
    writer: W,
}

impl DumpWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, DumpError> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> DumpWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_triangulation(&mut self, triangulation: &Triangulation) -> Result<(), DumpError> {
        writeln!(self.writer, "{VERTICES_MARKER}")?;
        self.write_points(&triangulation.vertices)?;

        writeln!(self.writer)?;
        writeln!(self.writer, "{TRIANGLES_MARKER}")?;
        for (i, triangle) in triangulation.triangles.iter().enumerate() {
            let [a, b, c] = triangle.vertices;
            writeln!(self.writer, "{i}\t({a}, {b}, {c})")?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_cell_diagram(&mut self, diagram: &CellDiagram) -> Result<(), DumpError> {
        writeln!(self.writer, "{VERTICES_MARKER}")?;
        self.write_points(&diagram.vertices)?;

        writeln!(self.writer)?;
        writeln!(self.writer, "{CELLS_MARKER}")?;
        for (i, cell) in diagram.cells.iter().enumerate() {
            let fields: Vec<String> = cell.vertices.iter().map(|v| v.to_string()).collect();
            writeln!(self.writer, "{i}\t({})", fields.join(", "))?;
        }

        if diagram.has_centroids() {
            writeln!(self.writer)?;
            writeln!(self.writer, "{CENTROIDS_MARKER}")?;
            self.write_points(&diagram.centroids)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn write_points(&mut self, points: &[Point]) -> Result<(), DumpError> {
        for (i, p) in points.iter().enumerate() {
            writeln!(self.writer, "{i}\t({}, {})", p.x, p.y)?;
        }
        Ok(())
    }
}
