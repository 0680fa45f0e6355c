use std::collections::HashMap;

use tracing::debug;
use types::*;

use crate::edge::{Edge, EdgeAttrs};
use crate::error::IngestError;
use crate::node::{Direction, NodeKey};

/// Not a valid `TimeslotId` format (see `TimeslotId::is_valid_format`) — used to keep a
/// faculty/room's `availability` set non-empty after a leave/outage removes every real slot,
/// since an empty set otherwise reads back as "no restriction" (§4.F). Exported so callers
/// (validation, reporting) can recognize and skip it rather than treat it as a dangling ref.
pub const NO_AVAILABILITY_SENTINEL: &str = "__NONE__";

/// The entity graph: one arena per label, indexed by id, with edges carried as
/// `(NodeKey, RelationKind, NodeKey)` triples and an adjacency index in both directions.
pub struct Store {
    grid: GridConfig,
    timeslots: Vec<Timeslot>,
    timeslot_index: HashMap<TimeslotId, usize>,

    departments: Vec<Department>,
    dept_index: HashMap<DeptId, usize>,
    programs: Vec<Program>,
    program_index: HashMap<ProgramId, usize>,
    years: Vec<YearTerm>,
    year_index: HashMap<YearTermId, usize>,
    sections: Vec<Section>,
    section_index: HashMap<SectionId, usize>,
    courses: Vec<Option<Course>>,
    course_index: HashMap<CourseId, usize>,
    faculty: Vec<Faculty>,
    faculty_index: HashMap<FacultyId, usize>,
    rooms: Vec<Room>,
    room_index: HashMap<RoomId, usize>,
    cohorts: Vec<Cohort>,
    cohort_index: HashMap<CohortId, usize>,
    policies: Vec<Policy>,
    policy_index: HashMap<PolicyId, usize>,

    edges: Vec<Edge>,
    adjacency_out: HashMap<NodeKey, Vec<usize>>,
    adjacency_in: HashMap<NodeKey, Vec<usize>>,
}

impl Store {
    pub fn new(grid: GridConfig) -> Self {
        let timeslots = grid.timeslots();
        let timeslot_index = timeslots
            .iter()
            .enumerate()
            .map(|(i, t)| (t.slot_id.clone(), i))
            .collect();
        Self {
            grid,
            timeslots,
            timeslot_index,
            departments: Vec::new(),
            dept_index: HashMap::new(),
            programs: Vec::new(),
            program_index: HashMap::new(),
            years: Vec::new(),
            year_index: HashMap::new(),
            sections: Vec::new(),
            section_index: HashMap::new(),
            courses: Vec::new(),
            course_index: HashMap::new(),
            faculty: Vec::new(),
            faculty_index: HashMap::new(),
            rooms: Vec::new(),
            room_index: HashMap::new(),
            cohorts: Vec::new(),
            cohort_index: HashMap::new(),
            policies: Vec::new(),
            policy_index: HashMap::new(),
            edges: Vec::new(),
            adjacency_out: HashMap::new(),
            adjacency_in: HashMap::new(),
        }
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    // ---- ingestion constructors -------------------------------------------------

    pub fn add_department(&mut self, d: Department) -> Result<NodeKey, IngestError> {
        if self.dept_index.contains_key(&d.id) {
            return Err(IngestError::Duplicate {
                label: "department",
                id: d.id.0,
            });
        }
        let idx = self.departments.len();
        self.dept_index.insert(d.id.clone(), idx);
        self.departments.push(d);
        Ok(NodeKey::Department(idx))
    }

    pub fn add_program(&mut self, p: Program) -> Result<NodeKey, IngestError> {
        if self.program_index.contains_key(&p.id) {
            return Err(IngestError::Duplicate {
                label: "program",
                id: p.id.0,
            });
        }
        let idx = self.programs.len();
        self.program_index.insert(p.id.clone(), idx);
        self.programs.push(p);
        Ok(NodeKey::Program(idx))
    }

    pub fn add_year(&mut self, y: YearTerm) -> Result<NodeKey, IngestError> {
        if self.year_index.contains_key(&y.id) {
            return Err(IngestError::Duplicate {
                label: "year_term",
                id: y.id.0,
            });
        }
        if !self.program_index.contains_key(&y.program_id) {
            return Err(IngestError::UnknownNode {
                label: "program",
                id: y.program_id.0,
            });
        }
        let idx = self.years.len();
        self.year_index.insert(y.id.clone(), idx);
        self.years.push(y);
        Ok(NodeKey::YearTerm(idx))
    }

    pub fn add_section(&mut self, s: Section) -> Result<NodeKey, IngestError> {
        if self.section_index.contains_key(&s.id) {
            return Err(IngestError::Duplicate {
                label: "section",
                id: s.id.0,
            });
        }
        if !self.year_index.contains_key(&s.year_id) {
            return Err(IngestError::UnknownNode {
                label: "year_term",
                id: s.year_id.0,
            });
        }
        let idx = self.sections.len();
        self.section_index.insert(s.id.clone(), idx);
        self.sections.push(s);
        Ok(NodeKey::Section(idx))
    }

    pub fn add_course(&mut self, c: Course) -> Result<NodeKey, IngestError> {
        if self.course_index.contains_key(&c.id) {
            return Err(IngestError::Duplicate {
                label: "course",
                id: c.id.0,
            });
        }
        if !self.dept_index.contains_key(&c.owner_dept) {
            return Err(IngestError::UnknownNode {
                label: "department",
                id: c.owner_dept.0,
            });
        }
        let idx = self.courses.len();
        self.course_index.insert(c.id.clone(), idx);
        self.courses.push(Some(c));
        Ok(NodeKey::Course(idx))
    }

    pub fn add_faculty(&mut self, f: Faculty) -> Result<NodeKey, IngestError> {
        if self.faculty_index.contains_key(&f.id) {
            return Err(IngestError::Duplicate {
                label: "faculty",
                id: f.id.0,
            });
        }
        let idx = self.faculty.len();
        self.faculty_index.insert(f.id.clone(), idx);
        self.faculty.push(f);
        Ok(NodeKey::Faculty(idx))
    }

    pub fn add_room(&mut self, r: Room) -> Result<NodeKey, IngestError> {
        if self.room_index.contains_key(&r.id) {
            return Err(IngestError::Duplicate {
                label: "room",
                id: r.id.0,
            });
        }
        let idx = self.rooms.len();
        self.room_index.insert(r.id.clone(), idx);
        self.rooms.push(r);
        Ok(NodeKey::Room(idx))
    }

    pub fn add_cohort(&mut self, c: Cohort) -> Result<NodeKey, IngestError> {
        if self.cohort_index.contains_key(&c.id) {
            return Err(IngestError::Duplicate {
                label: "cohort",
                id: c.id.0,
            });
        }
        for s in &c.constituent_sections {
            if !self.section_index.contains_key(s) {
                return Err(IngestError::UnknownNode {
                    label: "section",
                    id: s.0.clone(),
                });
            }
        }
        let idx = self.cohorts.len();
        self.cohort_index.insert(c.id.clone(), idx);
        self.cohorts.push(c);
        Ok(NodeKey::Cohort(idx))
    }

    pub fn add_policy(&mut self, p: Policy) -> Result<NodeKey, IngestError> {
        if self.policy_index.contains_key(&p.id) {
            return Err(IngestError::Duplicate {
                label: "policy",
                id: p.id.0,
            });
        }
        let idx = self.policies.len();
        self.policy_index.insert(p.id.clone(), idx);
        self.policies.push(p);
        Ok(NodeKey::Policy(idx))
    }

    // ---- link operations ---------------------------------------------------------

    pub fn dept_offers_course(&mut self, dept: &DeptId, course: &CourseId) -> Result<(), IngestError> {
        let from = self.dept_key(dept)?;
        let to = self.course_key(course)?;
        self.push_edge(from, RelationKind::Offers, to, EdgeAttrs::default());
        Ok(())
    }

    pub fn faculty_can_teach(
        &mut self,
        faculty: &FacultyId,
        course: &CourseId,
        proficiency: Option<i32>,
        last_taught: Option<i32>,
    ) -> Result<(), IngestError> {
        let from = self.faculty_key(faculty)?;
        let to = self.course_key(course)?;
        self.push_edge(
            from,
            RelationKind::CanTeach,
            to,
            EdgeAttrs {
                proficiency,
                last_taught,
            },
        );
        Ok(())
    }

    pub fn section_takes_course(&mut self, section: &SectionId, course: &CourseId) -> Result<(), IngestError> {
        let from = self.section_key(section)?;
        let to = self.course_key(course)?;
        self.push_edge(from, RelationKind::Takes, to, EdgeAttrs::default());
        Ok(())
    }

    pub fn cohort_elects_course(&mut self, cohort: &CohortId, course: &CourseId) -> Result<(), IngestError> {
        let from = self.cohort_key(cohort)?;
        let to = self.course_key(course)?;
        self.push_edge(from, RelationKind::Elects, to, EdgeAttrs::default());
        Ok(())
    }

    pub fn course_requires_course(&mut self, course: &CourseId, prereq: &CourseId) -> Result<(), IngestError> {
        let from = self.course_key(course)?;
        let to = self.course_key(prereq)?;
        self.push_edge(from, RelationKind::Requires, to, EdgeAttrs::default());
        Ok(())
    }

    pub fn room_is_type(&mut self, room: &RoomId, facility: FacilityToken) -> Result<(), IngestError> {
        let from = self.room_key(room)?;
        self.push_edge(
            from,
            RelationKind::IsType,
            NodeKey::FacilityType(facility),
            EdgeAttrs::default(),
        );
        Ok(())
    }

    /// Adds either a `TAKES` or `ELECTS` edge depending on which variant of `Group` the
    /// caller holds (§4.F What-If `add_enrollment`).
    pub fn add_enrollment(&mut self, group: &Group, course: &CourseId) -> Result<(), IngestError> {
        match group {
            Group::Section(id) => self.section_takes_course(id, course),
            Group::Cohort(id) => self.cohort_elects_course(id, course),
        }
    }

    pub fn remove_enrollment(&mut self, group: &Group, course: &CourseId) -> Result<(), IngestError> {
        let (from, rel) = match group {
            Group::Section(id) => (self.section_key(id)?, RelationKind::Takes),
            Group::Cohort(id) => (self.cohort_key(id)?, RelationKind::Elects),
        };
        let to = self.course_key(course)?;
        self.remove_edge(from, rel, to);
        Ok(())
    }

    // ---- What-If mutations (§4.F) -------------------------------------------------

    /// Clears the faculty's declared availability down to "everything except `leave_slots`".
    /// An originally-unrestricted faculty (empty `availability`) is first expanded to the
    /// full grid so the leave has something concrete to subtract from.
    pub fn apply_faculty_leave(&mut self, faculty: &FacultyId, leave_slots: &[TimeslotId]) -> Result<(), IngestError> {
        let idx = *self
            .faculty_index
            .get(faculty)
            .ok_or_else(|| IngestError::UnknownNode {
                label: "faculty",
                id: faculty.0.clone(),
            })?;
        let f = &mut self.faculty[idx];
        if f.availability.is_empty() {
            f.availability = self.timeslots.iter().map(|t| t.slot_id.clone()).collect();
        }
        for slot in leave_slots {
            f.availability.remove(slot);
        }
        // An empty set would read back as "unrestricted" (`is_available`'s empty-means-open
        // convention) — wrong after a leave that covers the whole grid. Keep the set
        // non-empty with a slot that can never match a real grid id.
        if f.availability.is_empty() {
            f.availability.insert(TimeslotId(NO_AVAILABILITY_SENTINEL.into()));
        }
        debug!(faculty = %faculty.0, removed = leave_slots.len(), "applied faculty leave");
        Ok(())
    }

    pub fn apply_room_outage(&mut self, room: &RoomId, outage_slots: &[TimeslotId]) -> Result<(), IngestError> {
        let idx = *self
            .room_index
            .get(room)
            .ok_or_else(|| IngestError::UnknownNode {
                label: "room",
                id: room.0.clone(),
            })?;
        let r = &mut self.rooms[idx];
        if r.availability.is_empty() {
            r.availability = self.timeslots.iter().map(|t| t.slot_id.clone()).collect();
        }
        for slot in outage_slots {
            r.availability.remove(slot);
        }
        if r.availability.is_empty() {
            r.availability.insert(TimeslotId(NO_AVAILABILITY_SENTINEL.into()));
        }
        debug!(room = %room.0, removed = outage_slots.len(), "applied room outage");
        Ok(())
    }

    /// Tombstones a course rather than shifting the arena, so existing `NodeKey::Course`
    /// indices held by edges and cached sessions stay valid (they just resolve to nothing).
    pub fn remove_course(&mut self, course: &CourseId) -> Result<(), IngestError> {
        let idx = self
            .course_index
            .remove(course)
            .ok_or_else(|| IngestError::UnknownNode {
                label: "course",
                id: course.0.clone(),
            })?;
        self.courses[idx] = None;
        let key = NodeKey::Course(idx);
        self.edges.retain(|e| e.from != key && e.to != key);
        self.rebuild_adjacency();
        Ok(())
    }

    // ---- node-key lookups (for traversal callers outside this crate) ---------------

    pub fn course_node_key(&self, id: &CourseId) -> Option<NodeKey> {
        self.course_key(id).ok()
    }

    pub fn faculty_node_key(&self, id: &FacultyId) -> Option<NodeKey> {
        self.faculty_key(id).ok()
    }

    pub fn section_node_key(&self, id: &SectionId) -> Option<NodeKey> {
        self.section_key(id).ok()
    }

    pub fn cohort_node_key(&self, id: &CohortId) -> Option<NodeKey> {
        self.cohort_key(id).ok()
    }

    // ---- typed accessors -----------------------------------------------------------

    pub fn department(&self, id: &DeptId) -> Option<&Department> {
        self.dept_index.get(id).map(|&i| &self.departments[i])
    }

    pub fn program(&self, id: &ProgramId) -> Option<&Program> {
        self.program_index.get(id).map(|&i| &self.programs[i])
    }

    pub fn year(&self, id: &YearTermId) -> Option<&YearTerm> {
        self.year_index.get(id).map(|&i| &self.years[i])
    }

    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.section_index.get(id).map(|&i| &self.sections[i])
    }

    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.course_index.get(id).and_then(|&i| self.courses[i].as_ref())
    }

    pub fn faculty(&self, id: &FacultyId) -> Option<&Faculty> {
        self.faculty_index.get(id).map(|&i| &self.faculty[i])
    }

    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.room_index.get(id).map(|&i| &self.rooms[i])
    }

    pub fn cohort(&self, id: &CohortId) -> Option<&Cohort> {
        self.cohort_index.get(id).map(|&i| &self.cohorts[i])
    }

    pub fn policy(&self, id: &PolicyId) -> Option<&Policy> {
        self.policy_index.get(id).map(|&i| &self.policies[i])
    }

    pub fn timeslot(&self, id: &TimeslotId) -> Option<&Timeslot> {
        self.timeslot_index.get(id).map(|&i| &self.timeslots[i])
    }

    // ---- stable-order collection accessors -----------------------------------------

    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn years(&self) -> &[YearTerm] {
        &self.years
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn courses(&self) -> Vec<&Course> {
        self.courses.iter().filter_map(|c| c.as_ref()).collect()
    }

    pub fn faculty_all(&self) -> &[Faculty] {
        &self.faculty
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn cohorts(&self) -> &[Cohort] {
        &self.cohorts
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    pub fn timeslots(&self) -> &[Timeslot] {
        &self.timeslots
    }

    // ---- graph traversal -----------------------------------------------------------

    /// Neighbors of `from` in `direction`, optionally filtered to a single relation.
    pub fn neighbors(
        &self,
        from: NodeKey,
        rel: Option<RelationKind>,
        direction: Direction,
    ) -> impl Iterator<Item = NodeKey> + '_ {
        let index = match direction {
            Direction::Out => &self.adjacency_out,
            Direction::In => &self.adjacency_in,
        };
        index
            .get(&from)
            .into_iter()
            .flatten()
            .filter_map(move |&edge_idx| {
                let e = &self.edges[edge_idx];
                if rel.map_or(true, |r| r == e.rel) {
                    Some(if direction == Direction::Out { e.to } else { e.from })
                } else {
                    None
                }
            })
    }

    pub fn edge_attrs(
        &self,
        from: NodeKey,
        rel: RelationKind,
        to: NodeKey,
    ) -> Option<&EdgeAttrs> {
        self.edges
            .iter()
            .find(|e| e.from == from && e.rel == rel && e.to == to)
            .map(|e| &e.attrs)
    }

    // ---- private helpers ------------------------------------------------------------

    fn dept_key(&self, id: &DeptId) -> Result<NodeKey, IngestError> {
        self.dept_index
            .get(id)
            .map(|&i| NodeKey::Department(i))
            .ok_or_else(|| IngestError::UnknownNode {
                label: "department",
                id: id.0.clone(),
            })
    }

    fn course_key(&self, id: &CourseId) -> Result<NodeKey, IngestError> {
        self.course_index
            .get(id)
            .filter(|&&i| self.courses[i].is_some())
            .map(|&i| NodeKey::Course(i))
            .ok_or_else(|| IngestError::UnknownNode {
                label: "course",
                id: id.0.clone(),
            })
    }

    fn faculty_key(&self, id: &FacultyId) -> Result<NodeKey, IngestError> {
        self.faculty_index
            .get(id)
            .map(|&i| NodeKey::Faculty(i))
            .ok_or_else(|| IngestError::UnknownNode {
                label: "faculty",
                id: id.0.clone(),
            })
    }

    fn section_key(&self, id: &SectionId) -> Result<NodeKey, IngestError> {
        self.section_index
            .get(id)
            .map(|&i| NodeKey::Section(i))
            .ok_or_else(|| IngestError::UnknownNode {
                label: "section",
                id: id.0.clone(),
            })
    }

    fn cohort_key(&self, id: &CohortId) -> Result<NodeKey, IngestError> {
        self.cohort_index
            .get(id)
            .map(|&i| NodeKey::Cohort(i))
            .ok_or_else(|| IngestError::UnknownNode {
                label: "cohort",
                id: id.0.clone(),
            })
    }

    fn room_key(&self, id: &RoomId) -> Result<NodeKey, IngestError> {
        self.room_index
            .get(id)
            .map(|&i| NodeKey::Room(i))
            .ok_or_else(|| IngestError::UnknownNode {
                label: "room",
                id: id.0.clone(),
            })
    }

    fn push_edge(&mut self, from: NodeKey, rel: RelationKind, to: NodeKey, attrs: EdgeAttrs) {
        let idx = self.edges.len();
        self.edges.push(Edge { from, rel, to, attrs });
        self.adjacency_out.entry(from).or_default().push(idx);
        self.adjacency_in.entry(to).or_default().push(idx);
    }

    fn remove_edge(&mut self, from: NodeKey, rel: RelationKind, to: NodeKey) {
        self.edges.retain(|e| !(e.from == from && e.rel == rel && e.to == to));
        self.rebuild_adjacency();
    }

    fn rebuild_adjacency(&mut self) {
        self.adjacency_out.clear();
        self.adjacency_in.clear();
        for (idx, e) in self.edges.iter().enumerate() {
            self.adjacency_out.entry(e.from).or_default().push(idx);
            self.adjacency_in.entry(e.to).or_default().push(idx);
        }
    }
}
