//! Deterministic depth-first back-tracking search.
//!
//! Places every required course period of every group into a
//! (slot, room, teacher) triple such that no slot carries the same room,
//! teacher or group twice across the whole run. All candidate enumerations
//! are stable, so identical inputs always yield identical assignment sets.
//!
//! Back-tracking is intra-run and cross-group: a completed group's placements
//! can be partially undone to unblock a later group. Nothing here touches the
//! repository; the caller commits the returned draft atomically.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::models::{
    Assignment, Classroom, Course, CourseId, GroupId, RoomId, SlotId, StudentGroup, Teacher,
    TeacherId, TimeSlot,
};

/// Raw search inputs. Ordering is applied internally; callers pass entities
/// as loaded.
#[derive(Debug, Clone)]
pub struct SearchInput {
    /// Groups to schedule, each with its course load.
    pub groups: Vec<(StudentGroup, Vec<Course>)>,
    pub slots: Vec<TimeSlot>,
    pub rooms: Vec<Classroom>,
    pub teachers: Vec<Teacher>,
    /// Assignments of groups outside this run; they seed the occupancy maps
    /// and are never modified.
    pub existing: Vec<Assignment>,
}

/// One placement produced by the search; ids are allocated at commit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftAssignment {
    pub group: GroupId,
    pub course: CourseId,
    pub teacher: TeacherId,
    pub room: RoomId,
    pub slot: SlotId,
}

/// Why a (group, course) could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ExhaustedReason {
    /// No classroom satisfies capacity and equipment at all.
    NoRoomFits,
    /// No teacher is eligible for the course at all.
    NoTeacherFits,
    /// The group already occupies every schedulable slot.
    NoFreeSlots,
    /// Resources exist but every combination clashes with other placements.
    GlobalConflicts,
}

impl std::fmt::Display for ExhaustedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRoomFits => write!(f, "no classroom fits the course"),
            Self::NoTeacherFits => write!(f, "no eligible teacher"),
            Self::NoFreeSlots => write!(f, "no free slots remain for the group"),
            Self::GlobalConflicts => write!(f, "blocked by conflicts with other placements"),
        }
    }
}

/// Progress snapshot reported when the deadline expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PartialReport {
    pub groups_completed: usize,
    pub periods_placed: usize,
    pub periods_required: usize,
}

/// Search result.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Complete(Vec<DraftAssignment>),
    Exhausted {
        group: GroupId,
        course: CourseId,
        reason: ExhaustedReason,
    },
    DeadlineExpired(PartialReport),
}

/// Run the search. `deadline` bounds wall-clock time; on expiry the partial
/// progress is reported and no placements are returned.
pub fn solve(input: &SearchInput, deadline: Option<Instant>) -> SearchOutcome {
    Searcher::new(input, deadline).run()
}

enum Step {
    Done,
    Failed,
    TimedOut,
}

/// One period still to place: indexes into the ordered group/course tables.
#[derive(Debug, Clone, Copy)]
struct Demand {
    group_idx: usize,
    course_idx: usize,
}

struct Searcher<'a> {
    groups: Vec<(&'a StudentGroup, Vec<&'a Course>)>,
    slot_order: Vec<SlotId>,
    demands: Vec<Demand>,
    room_candidates: HashMap<CourseId, Vec<RoomId>>,
    teacher_candidates: HashMap<CourseId, Vec<TeacherId>>,

    room_busy: HashSet<(SlotId, RoomId)>,
    teacher_busy: HashSet<(SlotId, TeacherId)>,
    group_busy: HashSet<(SlotId, GroupId)>,

    chosen: Vec<DraftAssignment>,
    deepest_failure: Option<(usize, ExhaustedReason)>,
    deadline: Option<Instant>,
}

impl<'a> Searcher<'a> {
    fn new(input: &'a SearchInput, deadline: Option<Instant>) -> Self {
        // Group order: (department, year, semester, id).
        let mut groups: Vec<(&StudentGroup, Vec<&Course>)> = input
            .groups
            .iter()
            .map(|(g, courses)| {
                // Course order within a group: periods descending, then code.
                let mut ordered: Vec<&Course> = courses.iter().collect();
                ordered.sort_by(|a, b| {
                    b.periods_per_week
                        .cmp(&a.periods_per_week)
                        .then_with(|| a.code.cmp(&b.code))
                });
                (g, ordered)
            })
            .collect();
        groups.sort_by(|(a, _), (b, _)| a.ordering_key().cmp(&b.ordering_key()));

        // Slot order: weekday, start time, id; break slots never enter.
        let mut slots: Vec<&TimeSlot> = input.slots.iter().filter(|s| !s.is_break).collect();
        slots.sort_by(|a, b| {
            a.ordering_key()
                .cmp(&b.ordering_key())
                .then_with(|| a.id.cmp(&b.id))
        });
        let slot_order: Vec<SlotId> = slots.iter().map(|s| s.id).collect();

        // Room order: capacity ascending, then id, so big rooms stay free for
        // big courses.
        let mut rooms: Vec<&Classroom> = input.rooms.iter().collect();
        rooms.sort_by(|a, b| a.capacity.cmp(&b.capacity).then_with(|| a.id.cmp(&b.id)));

        let mut teachers: Vec<&Teacher> = input.teachers.iter().collect();
        teachers.sort_by_key(|t| t.id);

        // Static per-course candidate lists.
        let mut room_candidates: HashMap<CourseId, Vec<RoomId>> = HashMap::new();
        let mut teacher_candidates: HashMap<CourseId, Vec<TeacherId>> = HashMap::new();
        for (_, courses) in &groups {
            for course in courses {
                room_candidates.entry(course.id).or_insert_with(|| {
                    rooms
                        .iter()
                        .filter(|r| r.suits(course))
                        .map(|r| r.id)
                        .collect()
                });
                teacher_candidates.entry(course.id).or_insert_with(|| {
                    teachers
                        .iter()
                        .filter(|t| t.is_eligible_for(course))
                        .map(|t| t.id)
                        .collect()
                });
            }
        }

        // One demand per required period, group-major.
        let mut demands = Vec::new();
        for (group_idx, (_, courses)) in groups.iter().enumerate() {
            for (course_idx, course) in courses.iter().enumerate() {
                for _ in 0..course.periods_per_week {
                    demands.push(Demand {
                        group_idx,
                        course_idx,
                    });
                }
            }
        }

        let mut searcher = Self {
            groups,
            slot_order,
            demands,
            room_candidates,
            teacher_candidates,
            room_busy: HashSet::new(),
            teacher_busy: HashSet::new(),
            group_busy: HashSet::new(),
            chosen: Vec::new(),
            deepest_failure: None,
            deadline,
        };

        for existing in &input.existing {
            searcher.room_busy.insert((existing.slot, existing.room));
            searcher
                .teacher_busy
                .insert((existing.slot, existing.teacher));
            searcher.group_busy.insert((existing.slot, existing.group));
        }

        searcher
    }

    fn run(mut self) -> SearchOutcome {
        match self.place(0) {
            Step::Done => SearchOutcome::Complete(self.chosen),
            Step::TimedOut => SearchOutcome::DeadlineExpired(self.partial_report()),
            Step::Failed => {
                let (idx, reason) = self
                    .deepest_failure
                    .unwrap_or((0, ExhaustedReason::GlobalConflicts));
                let demand = self.demands[idx];
                let (group, courses) = &self.groups[demand.group_idx];
                SearchOutcome::Exhausted {
                    group: group.id,
                    course: courses[demand.course_idx].id,
                    reason,
                }
            }
        }
    }

    fn place(&mut self, idx: usize) -> Step {
        if idx == self.demands.len() {
            return Step::Done;
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Step::TimedOut;
            }
        }

        let demand = self.demands[idx];
        let (group_id, course_id) = {
            let (group, courses) = &self.groups[demand.group_idx];
            (group.id, courses[demand.course_idx].id)
        };
        let slot_order = self.slot_order.clone();
        let rooms = self.room_candidates[&course_id].clone();
        let teachers = self.teacher_candidates[&course_id].clone();

        for slot in &slot_order {
            if self.group_busy.contains(&(*slot, group_id)) {
                continue;
            }
            for room in &rooms {
                if self.room_busy.contains(&(*slot, *room)) {
                    continue;
                }
                for teacher in &teachers {
                    if self.teacher_busy.contains(&(*slot, *teacher)) {
                        continue;
                    }

                    self.commit(*slot, group_id, course_id, *room, *teacher);
                    match self.place(idx + 1) {
                        Step::Done => return Step::Done,
                        Step::TimedOut => return Step::TimedOut,
                        Step::Failed => self.undo(),
                    }
                }
            }
        }

        self.note_failure(idx, group_id, course_id);
        Step::Failed
    }

    fn commit(
        &mut self,
        slot: SlotId,
        group: GroupId,
        course: CourseId,
        room: RoomId,
        teacher: TeacherId,
    ) {
        self.room_busy.insert((slot, room));
        self.teacher_busy.insert((slot, teacher));
        self.group_busy.insert((slot, group));
        self.chosen.push(DraftAssignment {
            group,
            course,
            teacher,
            room,
            slot,
        });
    }

    fn undo(&mut self) {
        let last = self.chosen.pop().expect("undo without commit");
        self.room_busy.remove(&(last.slot, last.room));
        self.teacher_busy.remove(&(last.slot, last.teacher));
        self.group_busy.remove(&(last.slot, last.group));
    }

    fn note_failure(&mut self, idx: usize, group: GroupId, course: CourseId) {
        let reason = if self.room_candidates[&course].is_empty() {
            ExhaustedReason::NoRoomFits
        } else if self.teacher_candidates[&course].is_empty() {
            ExhaustedReason::NoTeacherFits
        } else if self
            .slot_order
            .iter()
            .all(|slot| self.group_busy.contains(&(*slot, group)))
        {
            ExhaustedReason::NoFreeSlots
        } else {
            ExhaustedReason::GlobalConflicts
        };

        match self.deepest_failure {
            Some((deepest, _)) if deepest >= idx => {}
            _ => self.deepest_failure = Some((idx, reason)),
        }
    }

    fn partial_report(&self) -> PartialReport {
        let placed = self.chosen.len();
        let mut covered = 0;
        let mut groups_completed = 0;
        for (group_idx, (_, courses)) in self.groups.iter().enumerate() {
            let group_demands: usize = courses
                .iter()
                .map(|c| usize::from(c.periods_per_week))
                .sum();
            if covered + group_demands <= placed {
                covered += group_demands;
                groups_completed = group_idx + 1;
            } else {
                break;
            }
        }
        PartialReport {
            groups_completed,
            periods_placed: placed,
            periods_required: self.demands.len(),
        }
    }
}
