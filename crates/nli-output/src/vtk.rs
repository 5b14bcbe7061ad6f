//! Legacy ASCII VTK writers.
//!
//! Voxel fields are written as `CELL_DATA` on a lattice of
//! `(nx+1)·(ny+1)·(nz+1)` points, so every voxel is one VTK cell:
//!
//! | `VtkType`           | Geometry section                                   |
//! |---------------------|----------------------------------------------------|
//! | `STRUCTURED_POINTS` | `DIMENSIONS`, `ORIGIN`, `SPACING`                  |
//! | `RECTILINEAR_GRID`  | `DIMENSIONS`, `X/Y/Z_COORDINATES`                  |
//! | `STRUCTURED_GRID`   | `DIMENSIONS`, explicit `POINTS`                    |
//! | `UNSTRUCTURED_GRID` | explicit `POINTS`, one `VTK_VOXEL` cell per voxel  |
//!
//! Agents are written as point clouds with `POINT_DATA`, either `POLYDATA`
//! with `VERTICES` or `UNSTRUCTURED_GRID` with `VTK_VERTEX` cells.

use std::io::Write;

use nli_config::VtkType;
use nli_core::Point3;
use nli_grid::Grid;

use crate::{OutputError, OutputResult};

const VTK_VERTEX: u8 = 1;
const VTK_VOXEL: u8 = 11;

/// One named scalar per voxel.
#[derive(Clone, Copy, Debug)]
pub struct ScalarField<'a> {
    pub name:   &'a str,
    pub values: &'a [f64],
}

/// Agent positions with named per-agent scalars.
#[derive(Clone, Debug, Default)]
pub struct PointCloud {
    pub points:     Vec<Point3>,
    pub attributes: Vec<(String, Vec<f64>)>,
}

fn header(w: &mut dyn Write, title: &str, dataset: &str) -> OutputResult<()> {
    writeln!(w, "# vtk DataFile Version 3.0")?;
    // The title line is limited to one line of 256 characters.
    let title: String = title.chars().filter(|c| *c != '\n').take(255).collect();
    writeln!(w, "{title}")?;
    writeln!(w, "ASCII")?;
    writeln!(w, "DATASET {dataset}")?;
    Ok(())
}

fn scalars(w: &mut dyn Write, name: &str, values: &[f64]) -> OutputResult<()> {
    writeln!(w, "SCALARS {} double 1", name.replace(char::is_whitespace, "_"))?;
    writeln!(w, "LOOKUP_TABLE default")?;
    for v in values {
        writeln!(w, "{v}")?;
    }
    Ok(())
}

fn lattice_points(grid: &Grid) -> Vec<Point3> {
    let [nx, ny, nz] = grid.shape();
    let [dx, dy, dz] = grid.spacing();
    let mut pts = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
    for k in 0..=nz {
        for j in 0..=ny {
            for i in 0..=nx {
                pts.push(Point3::new(i as f64 * dx, j as f64 * dy, k as f64 * dz));
            }
        }
    }
    pts
}

fn points(w: &mut dyn Write, pts: &[Point3]) -> OutputResult<()> {
    writeln!(w, "POINTS {} double", pts.len())?;
    for p in pts {
        writeln!(w, "{} {} {}", p.x, p.y, p.z)?;
    }
    Ok(())
}

/// Write a voxel field as `kind`.  `POLYDATA` is rejected.
pub fn write_field(
    w:     &mut dyn Write,
    grid:  &Grid,
    field: ScalarField<'_>,
    kind:  VtkType,
    title: &str,
) -> OutputResult<()> {
    let [nx, ny, nz] = grid.shape();
    let [dx, dy, dz] = grid.spacing();
    let dims = format!("DIMENSIONS {} {} {}", nx + 1, ny + 1, nz + 1);

    match kind {
        VtkType::StructuredPoints => {
            header(w, title, "STRUCTURED_POINTS")?;
            writeln!(w, "{dims}")?;
            writeln!(w, "ORIGIN 0 0 0")?;
            writeln!(w, "SPACING {dx} {dy} {dz}")?;
        }
        VtkType::RectilinearGrid => {
            header(w, title, "RECTILINEAR_GRID")?;
            writeln!(w, "{dims}")?;
            for (axis, n, d) in [("X", nx, dx), ("Y", ny, dy), ("Z", nz, dz)] {
                writeln!(w, "{axis}_COORDINATES {} double", n + 1)?;
                let coords: Vec<String> = (0..=n).map(|i| (i as f64 * d).to_string()).collect();
                writeln!(w, "{}", coords.join(" "))?;
            }
        }
        VtkType::StructuredGrid => {
            header(w, title, "STRUCTURED_GRID")?;
            writeln!(w, "{dims}")?;
            points(w, &lattice_points(grid))?;
        }
        VtkType::UnstructuredGrid => {
            header(w, title, "UNSTRUCTURED_GRID")?;
            points(w, &lattice_points(grid))?;
            let cells = grid.voxel_count();
            writeln!(w, "CELLS {cells} {}", cells * 9)?;
            let px = nx + 1;
            let pxy = (nx + 1) * (ny + 1);
            for k in 0..nz {
                for j in 0..ny {
                    for i in 0..nx {
                        let p0 = i + j * px + k * pxy;
                        writeln!(
                            w,
                            "8 {} {} {} {} {} {} {} {}",
                            p0,
                            p0 + 1,
                            p0 + px,
                            p0 + px + 1,
                            p0 + pxy,
                            p0 + pxy + 1,
                            p0 + pxy + px,
                            p0 + pxy + px + 1
                        )?;
                    }
                }
            }
            writeln!(w, "CELL_TYPES {cells}")?;
            for _ in 0..cells {
                writeln!(w, "{VTK_VOXEL}")?;
            }
        }
        VtkType::PolyData => {
            return Err(OutputError::Unsupported { kind, what: "a voxel field" });
        }
    }

    writeln!(w, "CELL_DATA {}", field.values.len())?;
    scalars(w, field.name, field.values)
}

/// Write agents as `POLYDATA` or `UNSTRUCTURED_GRID` vertices.
pub fn write_points(w: &mut dyn Write, cloud: &PointCloud, kind: VtkType, title: &str) -> OutputResult<()> {
    let n = cloud.points.len();
    match kind {
        VtkType::PolyData => {
            header(w, title, "POLYDATA")?;
            points(w, &cloud.points)?;
            writeln!(w, "VERTICES {n} {}", n * 2)?;
            for i in 0..n {
                writeln!(w, "1 {i}")?;
            }
        }
        VtkType::UnstructuredGrid => {
            header(w, title, "UNSTRUCTURED_GRID")?;
            points(w, &cloud.points)?;
            writeln!(w, "CELLS {n} {}", n * 2)?;
            for i in 0..n {
                writeln!(w, "1 {i}")?;
            }
            writeln!(w, "CELL_TYPES {n}")?;
            for _ in 0..n {
                writeln!(w, "{VTK_VERTEX}")?;
            }
        }
        _ => return Err(OutputError::Unsupported { kind, what: "a point cloud" }),
    }

    if !cloud.attributes.is_empty() {
        writeln!(w, "POINT_DATA {n}")?;
        for (name, values) in &cloud.attributes {
            scalars(w, name, values)?;
        }
    }
    Ok(())
}
