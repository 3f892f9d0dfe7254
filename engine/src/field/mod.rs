//! The shaped grid each player's fleet is placed on.

use std::collections::{HashMap, HashSet};

use log::info;

use crate::coord::Coord;
use crate::entity::{EntityId, EntityKind};
use crate::geometry;

mod cell;
pub mod errors;

pub use cell::{Cell, Occupant};
pub use errors::FieldError;

/// Tag recorded on a [`Field`] describing how it was generated. `Rectangle` fields never
/// have void cells; every other shape is rasterized and embedded in its bounding box.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Shape {
    Rectangle,
    Circle,
    Triangle,
    Rhombus,
    Pentagon,
    Hexagon,
    Heptagon,
}

impl Shape {
    /// Number of vertices for polygon shapes. `Rectangle` and `Circle` aren't polygons.
    fn sides(self) -> Option<u32> {
        match self {
            Shape::Triangle => Some(3),
            Shape::Rhombus => Some(4),
            Shape::Pentagon => Some(5),
            Shape::Hexagon => Some(6),
            Shape::Heptagon => Some(7),
            Shape::Rectangle | Shape::Circle => None,
        }
    }
}

/// Parameters used to (re)generate a [`Field`]. Rectangle fields take `height`/`width`
/// directly; every other shape is rasterized from a `radius` and a starting
/// `angle_degrees`, then embedded in the minimum bounding rectangle of its border.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FieldSpec {
    Rectangle { height: usize, width: usize },
    Circle { radius: i32 },
    Polygon { shape: Shape, radius: i32, angle_degrees: f64 },
}

/// A single player's shaped grid. Owns cell state (void/shot/occupant) but not the
/// [`Entity`](crate::entity::Entity) values themselves — those live in the owning
/// [`Player`](crate::player::Player)'s entity map, keyed by the same [`EntityId`] stored
/// in each occupied [`Cell`].
#[derive(Debug, Clone)]
pub struct Field {
    cells: HashMap<Coord, Cell>,
    height: usize,
    width: usize,
    shape: Shape,
}

impl Field {
    /// An empty field with no cells. [`Field::is_empty`] returns `true` until
    /// [`Field::generate`] is called.
    pub fn empty() -> Self {
        Self {
            cells: HashMap::new(),
            height: 0,
            width: 0,
            shape: Shape::Rectangle,
        }
    }

    /// Generates a field from `spec`, discarding any previous cell state.
    pub fn generate(spec: FieldSpec) -> Result<Self, FieldError> {
        let field = match spec {
            FieldSpec::Rectangle { height, width } => Self::generate_rectangle(height, width),
            FieldSpec::Circle { radius } => Self::generate_circle(radius),
            FieldSpec::Polygon { shape, radius, angle_degrees } => {
                let sides = shape.sides().ok_or(FieldError::UnsupportedShape)?;
                Self::generate_ngon(shape, sides, radius, angle_degrees)
            }
        }?;
        info!("field generated: {:?} {}x{}, {} useful cells", field.shape, field.height, field.width, field.useful_cells().len());
        Ok(field)
    }

    fn generate_rectangle(height: usize, width: usize) -> Result<Self, FieldError> {
        if height == 0 || width == 0 {
            return Err(FieldError::InvalidDimensions);
        }
        let mut cells = HashMap::with_capacity(height * width);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                cells.insert(Coord::new(y, x), Cell::new());
            }
        }
        Ok(Self { cells, height, width, shape: Shape::Rectangle })
    }

    fn generate_circle(radius: i32) -> Result<Self, FieldError> {
        if radius < 0 {
            return Err(FieldError::InvalidDimensions);
        }
        let size = (2 * radius + 1) as usize;
        let center = Coord::new(radius, radius);
        let mut field = Self::generate_rectangle(size, size)?;
        field.shape = Shape::Circle;
        let border = geometry::circle_coords(radius, center);
        field.vodify_corners(&border);
        Ok(field)
    }

    fn generate_ngon(shape: Shape, sides: u32, radius: i32, angle_degrees: f64) -> Result<Self, FieldError> {
        if radius < 0 {
            return Err(FieldError::InvalidDimensions);
        }
        let border = geometry::ngon_coords(sides, radius, angle_degrees, Coord::new(0, 0));
        let y_min = border.iter().map(|c| c.y).min().unwrap();
        let y_max = border.iter().map(|c| c.y).max().unwrap() - y_min + 1;
        let x_min = border.iter().map(|c| c.x).min().unwrap();
        let x_max = border.iter().map(|c| c.x).max().unwrap() - x_min + 1;

        let normalized: Vec<Coord> = border.iter().map(|c| Coord::new(c.y - y_min, c.x - x_min)).collect();

        let mut field = Self::generate_rectangle(y_max as usize, x_max as usize)?;
        field.shape = shape;
        field.vodify_corners(&normalized);
        Ok(field)
    }

    /// Voids every cell outside the rasterized `border`, scanning each row from both
    /// sides and stopping as soon as a border cell is reached — this "cuts" the shape out
    /// of the bounding rectangle without touching interior cells the border doesn't
    /// enclose.
    fn vodify_corners(&mut self, border: &[Coord]) {
        let border_set: HashSet<Coord> = border.iter().copied().collect();
        let mut voided = HashSet::new();

        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if !border_set.contains(&Coord::new(y, x)) {
                    voided.insert(Coord::new(y, x));
                } else {
                    break;
                }
            }
            for x in (0..self.width as i32).rev() {
                if !border_set.contains(&Coord::new(y, x)) {
                    voided.insert(Coord::new(y, x));
                } else {
                    break;
                }
            }
        }

        for coord in voided {
            if let Some(cell) = self.cells.get_mut(&coord) {
                cell.is_void = true;
            }
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All non-void coordinates.
    pub fn useful_cells(&self) -> Vec<Coord> {
        self.cells.iter().filter(|(_, c)| !c.is_void).map(|(c, _)| *c).collect()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains_key(&coord)
    }

    pub fn get_cell(&self, coord: Coord) -> Result<&Cell, FieldError> {
        if self.is_empty() {
            return Err(FieldError::Empty);
        }
        self.cells.get(&coord).ok_or(FieldError::MissingCell(coord))
    }

    fn get_cell_mut(&mut self, coord: Coord) -> Result<&mut Cell, FieldError> {
        if self.cells.is_empty() {
            return Err(FieldError::Empty);
        }
        self.cells.get_mut(&coord).ok_or(FieldError::MissingCell(coord))
    }

    /// The eight-connected neighbors of `coords` that lie on the field and aren't
    /// themselves part of `coords`.
    pub fn neighbors(&self, coords: &[Coord]) -> HashSet<Coord> {
        let origin: HashSet<Coord> = coords.iter().copied().collect();
        let mut out = HashSet::new();
        for c in coords {
            for (dy, dx) in [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)] {
                let n = Coord::new(c.y + dy, c.x + dx);
                if !origin.contains(&n) && self.cells.contains_key(&n) {
                    out.insert(n);
                }
            }
        }
        out
    }

    /// Attempts to place a non-planet entity of the given `kind`/`size` at `anchor` with
    /// `rotation`. `previous_cells` are freed first so re-placement works. Implements the
    /// "reserve then commit" two-pass shape from the source: reserved cells and their
    /// neighbors are fully validated before anything is written, so a failed placement
    /// never mutates the field.
    pub fn occupy_cells(
        &mut self,
        id: EntityId,
        kind: EntityKind,
        size: usize,
        anchor: Coord,
        rotation: i32,
        previous_cells: &[Coord],
    ) -> Result<(Vec<Coord>, i32), FieldError> {
        let (reserved, rotation) = crate::entity::reserve_coords(anchor, rotation, size);

        for coord in self.neighbors(&reserved) {
            let cell = self.get_cell(coord)?;
            if let Some(occ) = cell.occupied_by {
                if occ.kind != EntityKind::Planet {
                    return Err(FieldError::TouchesOther(coord));
                }
            }
        }

        for &coord in &reserved {
            let cell = self.get_cell(coord)?;
            if cell.is_void {
                return Err(FieldError::IntoVoid(coord));
            }
            if cell.occupied_by.is_some() {
                return Err(FieldError::AlreadyOccupied(coord));
            }
        }

        for &coord in previous_cells {
            if let Ok(cell) = self.get_cell_mut(coord) {
                cell.free();
            }
        }
        for &coord in &reserved {
            self.get_cell_mut(coord)?.occupied_by = Some(Occupant { id, kind });
        }

        Ok((reserved, rotation))
    }

    /// Places a planet given its full (possibly off-field) `orbit_cells`. Accepted as
    /// long as at least one orbit cell lies on the field, void or not. Returns the
    /// subset of orbit cells that are actually on the field — the planet's
    /// `cells_occupied`.
    pub fn setup_a_planet(&mut self, id: EntityId, orbit_cells: &[Coord]) -> Result<Vec<Coord>, FieldError> {
        let mut on_field = Vec::new();
        for &coord in orbit_cells {
            if self.cells.contains_key(&coord) {
                on_field.push(coord);
            }
        }
        if on_field.is_empty() {
            return Err(FieldError::OrbitNeverCrosses);
        }
        for &coord in &on_field {
            self.get_cell_mut(coord)?.occupied_by = Some(Occupant { id, kind: EntityKind::Planet });
        }
        Ok(on_field)
    }

    /// Fires at `coord`. Fails if the cell is void or already shot. Returns the occupant
    /// (if any) so the caller — which holds the entity map — can resolve ship/relay
    /// damage or check a planet's current anchor.
    pub fn shoot_cell(&mut self, coord: Coord) -> Result<Option<Occupant>, FieldError> {
        let cell = self.get_cell_mut(coord)?;
        if cell.is_void || cell.was_shot {
            return Err(FieldError::NotATarget(coord));
        }
        cell.was_shot = true;
        Ok(cell.occupied_by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;

    #[test]
    fn rectangle_has_no_void_cells() {
        let field = Field::generate(FieldSpec::Rectangle { height: 10, width: 10 }).unwrap();
        assert_eq!(field.useful_cells().len(), 100);
    }

    #[test]
    fn circle_voids_the_corners() {
        let field = Field::generate(FieldSpec::Circle { radius: 5 }).unwrap();
        assert_eq!(field.height(), 11);
        assert_eq!(field.width(), 11);
        let corner = field.get_cell(Coord::new(0, 0)).unwrap();
        assert!(corner.is_void());
        let center = field.get_cell(Coord::new(5, 5)).unwrap();
        assert!(!center.is_void());
    }

    #[test]
    fn occupy_then_shoot() {
        let mut field = Field::generate(FieldSpec::Rectangle { height: 10, width: 10 }).unwrap();
        let (cells, rot) = field
            .occupy_cells(1, EntityKind::Destroyer, 3, Coord::new(0, 0), 0, &[])
            .unwrap();
        assert_eq!(rot, 0);
        assert_eq!(cells, vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)]);

        let occ = field.shoot_cell(Coord::new(0, 1)).unwrap();
        assert_eq!(occ.unwrap().id, 1);
        assert!(matches!(field.shoot_cell(Coord::new(0, 1)), Err(FieldError::NotATarget(_))));
    }

    #[test]
    fn touching_other_ship_rejected() {
        let mut field = Field::generate(FieldSpec::Rectangle { height: 10, width: 10 }).unwrap();
        field.occupy_cells(1, EntityKind::Corvette, 1, Coord::new(2, 2), 0, &[]).unwrap();
        let err = field.occupy_cells(2, EntityKind::Corvette, 1, Coord::new(2, 3), 0, &[]).unwrap_err();
        assert!(matches!(err, FieldError::TouchesOther(_)));
    }

    #[test]
    fn ships_may_brush_planet_orbit() {
        let mut field = Field::generate(FieldSpec::Rectangle { height: 10, width: 10 }).unwrap();
        field.setup_a_planet(1, &[Coord::new(2, 3)]).unwrap();
        field.occupy_cells(2, EntityKind::Corvette, 1, Coord::new(2, 2), 0, &[]).unwrap();
    }

    #[test]
    fn failed_placement_does_not_mutate_field() {
        let mut field = Field::generate(FieldSpec::Rectangle { height: 10, width: 10 }).unwrap();
        field.occupy_cells(1, EntityKind::Corvette, 1, Coord::new(0, 0), 0, &[]).unwrap();
        let err = field
            .occupy_cells(2, EntityKind::Destroyer, 3, Coord::new(0, 0), 0, &[])
            .unwrap_err();
        assert!(matches!(err, FieldError::AlreadyOccupied(_)));
        // cell (0,0) is still solely owned by entity 1.
        assert_eq!(field.get_cell(Coord::new(0, 0)).unwrap().occupied_by().unwrap().id, 1);
    }
}
