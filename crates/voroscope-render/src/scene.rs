//! Scene assembly and drawing: triangulation edge plots, cell diagram
//! outlines, and the combined overlay of both.

use std::path::Path;

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use thiserror::Error;

use voroscope_core::geometry::BBox;
use voroscope_core::spatial::{SpatialEntry, SpatialIndex};
use voroscope_core::tessellation::{CellDiagram, InvalidReference, Triangulation};
use voroscope_core::Point;

use crate::options::RenderOptions;
use crate::viewport::{Viewport, PLOT_MARGIN};

// ── Errors ────────────────────────────────────────────────────────────

/// Errors produced while rendering. A dangling vertex reference aborts
/// the render before anything is drawn; a tessellation must never be
/// depicted with elements silently dropped or clipped away.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Reference(#[from] InvalidReference),

    #[error("unsupported image format {0:?}, expected png, bmp or svg")]
    UnsupportedFormat(String),

    #[error("nothing to draw and no explicit axis bounds to frame")]
    EmptyScene,

    #[error("drawing backend: {0}")]
    Backend(String),
}

fn backend_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Backend(e.to_string())
}

// ── Public entry points ───────────────────────────────────────────────

/// Draw every triangle's three boundary segments, plus optional vertex
/// markers, and write the image to `path`.
pub fn render_triangulation<P: AsRef<Path>>(
    triangulation: &Triangulation,
    options: &RenderOptions,
    path: P,
) -> Result<(), RenderError> {
    let path = path.as_ref();
    triangulation.validate()?;
    let viewport = resolve_viewport(triangulation.bbox(), options)?;
    log::info!(
        "rendering {} triangles over {} vertices to {}",
        triangulation.triangle_count(),
        triangulation.vertex_count(),
        path.display()
    );
    let scene = Scene {
        triangulation: Some(triangulation),
        diagram: None,
        mute_triangulation: false,
    };
    write_image(&scene, options, &viewport, path)
}

/// Draw each cell as a polygon outline (closed by default), plus optional
/// vertex and centroid markers, and write the image to `path`.
pub fn render_cell_diagram<P: AsRef<Path>>(
    diagram: &CellDiagram,
    options: &RenderOptions,
    path: P,
) -> Result<(), RenderError> {
    let path = path.as_ref();
    diagram.validate()?;
    let viewport = resolve_viewport(diagram.bbox(), options)?;
    log::info!(
        "rendering {} cells over {} vertices to {}",
        diagram.cell_count(),
        diagram.vertex_count(),
        path.display()
    );
    let scene = Scene {
        triangulation: None,
        diagram: Some(diagram),
        mute_triangulation: false,
    };
    write_image(&scene, options, &viewport, path)
}

/// Draw a triangulation and its dual cell diagram on one canvas: the
/// triangulation muted in the background, cell outlines and centroid
/// markers on top.
pub fn render_combined<P: AsRef<Path>>(
    triangulation: &Triangulation,
    diagram: &CellDiagram,
    options: &RenderOptions,
    path: P,
) -> Result<(), RenderError> {
    let path = path.as_ref();
    triangulation.validate()?;
    diagram.validate()?;

    let data_bbox = match (triangulation.bbox(), diagram.bbox()) {
        (Some(a), Some(b)) => Some(a.union(&b)),
        (a, b) => a.or(b),
    };
    let viewport = resolve_viewport(data_bbox, options)?;
    log::info!(
        "rendering {} triangles and {} cells to {}",
        triangulation.triangle_count(),
        diagram.cell_count(),
        path.display()
    );
    let scene = Scene {
        triangulation: options
            .show_triangulation_overlay
            .then_some(triangulation),
        diagram: Some(diagram),
        mute_triangulation: true,
    };
    write_image(&scene, options, &viewport, path)
}

// ── Scene assembly ────────────────────────────────────────────────────

struct Scene<'a> {
    triangulation: Option<&'a Triangulation>,
    diagram: Option<&'a CellDiagram>,
    mute_triangulation: bool,
}

fn resolve_viewport(data: Option<BBox>, options: &RenderOptions) -> Result<Viewport, RenderError> {
    match options.axis_bounds {
        Some(bounds) => Ok(Viewport::from_axis_bounds(bounds, options.plot_width)),
        None => data
            .map(|bbox| Viewport::fit(bbox, options.plot_width))
            .ok_or(RenderError::EmptyScene),
    }
}

enum ImageFormat {
    Bitmap,
    Svg,
}

fn image_format(path: &Path) -> Result<ImageFormat, RenderError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match extension.as_str() {
        "png" | "bmp" => Ok(ImageFormat::Bitmap),
        "svg" => Ok(ImageFormat::Svg),
        other => Err(RenderError::UnsupportedFormat(other.to_string())),
    }
}

fn write_image(
    scene: &Scene<'_>,
    options: &RenderOptions,
    viewport: &Viewport,
    path: &Path,
) -> Result<(), RenderError> {
    let size = viewport.canvas_size();
    match image_format(path)? {
        ImageFormat::Bitmap => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_scene(&root, scene, options, viewport)
        }
        ImageFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_scene(&root, scene, options, viewport)
        }
    }
}

// ── Drawing ───────────────────────────────────────────────────────────

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn draw_scene<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene<'_>,
    options: &RenderOptions,
    viewport: &Viewport,
) -> Result<(), RenderError> {
    root.fill(&WHITE).map_err(backend_err)?;
    let mut chart = ChartBuilder::on(root)
        .margin(PLOT_MARGIN)
        .build_cartesian_2d(viewport.x_range(), viewport.y_range())
        .map_err(backend_err)?;

    // Culling only applies to an explicit window; a fitted window always
    // contains all elements.
    let window = options.axis_bounds.map(|_| viewport.bounds);
    let window = window.as_ref();

    let grid_style: ShapeStyle = options.grid_color.rgb().stroke_width(1);
    for polygon in &options.overlay_reference_grid {
        let mut outline: Vec<(f64, f64)> = polygon.iter().map(|p| (p.x, p.y)).collect();
        if let Some(&first) = outline.first() {
            outline.push(first);
        }
        chart
            .draw_series(std::iter::once(PathElement::new(outline, grid_style)))
            .map_err(backend_err)?;
    }

    if let Some(triangulation) = scene.triangulation {
        draw_triangulation(
            &mut chart,
            triangulation,
            options,
            window,
            scene.mute_triangulation,
        )?;
    }
    if let Some(diagram) = scene.diagram {
        draw_cell_diagram(&mut chart, diagram, options, window)?;
    }

    root.present().map_err(backend_err)?;
    Ok(())
}

fn draw_triangulation<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    triangulation: &Triangulation,
    options: &RenderOptions,
    window: Option<&BBox>,
    muted: bool,
) -> Result<(), RenderError> {
    let edge_style: ShapeStyle = if muted {
        options
            .overlay_color
            .rgb()
            .mix(options.overlay_alpha)
            .stroke_width(1)
    } else {
        options.edge_color.rgb().stroke_width(1)
    };

    let visible = visible_elements(
        triangulation.triangle_count(),
        |i| Some(triangulation.triangle_bbox(&triangulation.triangles[i])),
        window,
    );
    chart
        .draw_series(visible.iter().map(|&i| {
            let [a, b, c] = triangulation.triangle_points(&triangulation.triangles[i]);
            PathElement::new(
                vec![(a.x, a.y), (b.x, b.y), (c.x, c.y), (a.x, a.y)],
                edge_style,
            )
        }))
        .map_err(backend_err)?;

    if options.show_vertices {
        let marker_style: ShapeStyle = if muted {
            options
                .overlay_color
                .rgb()
                .mix(options.overlay_alpha)
                .filled()
        } else {
            options.vertex_style.color.rgb().filled()
        };
        chart
            .draw_series(
                triangulation
                    .vertices
                    .iter()
                    .filter(|p| in_window(p, window))
                    .map(|p| Circle::new((p.x, p.y), options.vertex_style.size, marker_style)),
            )
            .map_err(backend_err)?;
    }
    Ok(())
}

fn draw_cell_diagram<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    diagram: &CellDiagram,
    options: &RenderOptions,
    window: Option<&BBox>,
) -> Result<(), RenderError> {
    let outline_style: ShapeStyle = options.cell_color.rgb().stroke_width(1);

    let visible = visible_elements(
        diagram.cell_count(),
        |i| diagram.cell_bbox(&diagram.cells[i]),
        window,
    );
    chart
        .draw_series(visible.iter().map(|&i| {
            let mut outline: Vec<(f64, f64)> = diagram
                .cell_points(&diagram.cells[i])
                .iter()
                .map(|p| (p.x, p.y))
                .collect();
            if options.close_cell_polygons {
                if let Some(&first) = outline.first() {
                    outline.push(first);
                }
            }
            PathElement::new(outline, outline_style)
        }))
        .map_err(backend_err)?;

    if options.show_vertices {
        let marker_style: ShapeStyle = options.vertex_style.color.rgb().filled();
        chart
            .draw_series(
                diagram
                    .vertices
                    .iter()
                    .filter(|p| in_window(p, window))
                    .map(|p| Circle::new((p.x, p.y), options.vertex_style.size, marker_style)),
            )
            .map_err(backend_err)?;
    }

    if options.show_centroids && diagram.has_centroids() {
        let marker_style: ShapeStyle = options.centroid_style.color.rgb().stroke_width(1);
        chart
            .draw_series(
                diagram
                    .centroids
                    .iter()
                    .filter(|p| in_window(p, window))
                    .map(|p| Cross::new((p.x, p.y), options.centroid_style.size, marker_style)),
            )
            .map_err(backend_err)?;
    }
    Ok(())
}

/// Indices of the elements to draw, in ascending order. With an explicit
/// window the spatial index drops elements wholly outside of it.
fn visible_elements(
    count: usize,
    bbox_of: impl Fn(usize) -> Option<BBox>,
    window: Option<&BBox>,
) -> Vec<usize> {
    let Some(window) = window else {
        return (0..count).collect();
    };
    let entries: Vec<SpatialEntry> = (0..count)
        .filter_map(|i| {
            bbox_of(i).map(|bbox| SpatialEntry {
                element_index: i,
                bbox,
            })
        })
        .collect();
    let index = SpatialIndex::build(entries);
    let mut visible: Vec<usize> = index
        .query_window(window)
        .into_iter()
        .map(|e| e.element_index)
        .collect();
    visible.sort_unstable();
    visible
}

fn in_window(point: &Point, window: Option<&BBox>) -> bool {
    window.map_or(true, |w| w.contains_point(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    use voroscope_core::tessellation::{Cell, Triangle};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(name)
    }

    fn sample_triangulation() -> Triangulation {
        Triangulation::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(0.0, 1.0),
            ],
            vec![Triangle::new(0, 1, 2)],
        )
    }

    fn sample_diagram() -> CellDiagram {
        CellDiagram::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(0.0, 1.0),
            ],
            vec![Cell::new(vec![0, 1, 2, 3])],
            vec![],
        )
    }

    #[test]
    fn test_render_triangulation_png() {
        let path = temp_path("voroscope-scene-triangulation.png");
        render_triangulation(&sample_triangulation(), &RenderOptions::default(), &path).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert!(!bytes.is_empty());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_render_cell_diagram_svg() {
        let path = temp_path("voroscope-scene-diagram.svg");
        render_cell_diagram(&sample_diagram(), &RenderOptions::default(), &path).unwrap();
        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_render_combined() {
        let path = temp_path("voroscope-scene-combined.png");
        render_combined(
            &sample_triangulation(),
            &sample_diagram(),
            &RenderOptions::default(),
            &path,
        )
        .unwrap();
        assert!(path.exists());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_render_is_deterministic() {
        let first = temp_path("voroscope-scene-idempotent-a.png");
        let second = temp_path("voroscope-scene-idempotent-b.png");
        let options = RenderOptions::default().with_axis_bounds(0.0, 1.0, 0.0, 1.0);
        render_triangulation(&sample_triangulation(), &options, &first).unwrap();
        render_triangulation(&sample_triangulation(), &options, &second).unwrap();
        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
        fs::remove_file(&first).unwrap();
        fs::remove_file(&second).unwrap();
    }

    #[test]
    fn test_dangling_reference_writes_nothing() {
        let path = temp_path("voroscope-scene-dangling.png");
        let bad = Triangulation::new(vec![Point::new(0.0, 0.0)], vec![Triangle::new(0, 1, 2)]);
        let err = render_triangulation(&bad, &RenderOptions::default(), &path).unwrap_err();
        assert!(matches!(err, RenderError::Reference(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_unsupported_format() {
        let err = render_triangulation(
            &sample_triangulation(),
            &RenderOptions::default(),
            temp_path("voroscope-scene.gif"),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedFormat(ref ext) if ext == "gif"));
    }

    #[test]
    fn test_empty_scene_needs_bounds() {
        let empty = Triangulation::new(vec![], vec![]);
        let err = render_triangulation(
            &empty,
            &RenderOptions::default(),
            temp_path("voroscope-scene-empty.png"),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::EmptyScene));

        let framed = RenderOptions::default().with_axis_bounds(0.0, 1.0, 0.0, 1.0);
        let path = temp_path("voroscope-scene-framed.png");
        render_triangulation(&empty, &framed, &path).unwrap();
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_explicit_window_culls_far_elements() {
        let mut triangulation = sample_triangulation();
        triangulation.vertices.push(Point::new(100.0, 100.0));
        triangulation.vertices.push(Point::new(101.0, 100.0));
        triangulation.vertices.push(Point::new(100.0, 101.0));
        triangulation.triangles.push(Triangle::new(3, 4, 5));

        let near = visible_elements(
            triangulation.triangle_count(),
            |i| Some(triangulation.triangle_bbox(&triangulation.triangles[i])),
            Some(&BBox::new(Point::new(-1.0, -1.0), Point::new(2.0, 2.0))),
        );
        assert_eq!(near, vec![0]);

        let all = visible_elements(
            triangulation.triangle_count(),
            |i| Some(triangulation.triangle_bbox(&triangulation.triangles[i])),
            None,
        );
        assert_eq!(all, vec![0, 1]);
    }
}
