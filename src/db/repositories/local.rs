//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMap and Vec structures, providing fast, deterministic,
//! and isolated execution.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::db::repository::*;
use crate::models::{
    AcademicCalendar, AcademicSession, AcademicYear, Assignment, AssignmentId, AttendanceRecord,
    AttendanceToken, Classroom, ClassInstanceId, Course, CourseId, GroupId, Holiday, RoomId,
    SlotId, Student, StudentGroup, StudentId, Teacher, TeacherId, TimeSlot,
};

/// In-memory local repository.
///
/// Stores all data in HashMaps behind a single `RwLock`, which also gives
/// the conditional writes (`commit_scan`, `append_absences`,
/// `replace_assignments`) their atomicity.
///
/// # Example
/// ```
/// use tas_rust::db::LocalRepository;
///
/// let repo = LocalRepository::new();
/// assert_eq!(repo.assignment_count(), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

#[derive(Default)]
struct LocalData {
    courses: HashMap<CourseId, Course>,
    teachers: HashMap<TeacherId, Teacher>,
    classrooms: HashMap<RoomId, Classroom>,
    time_slots: HashMap<SlotId, TimeSlot>,
    groups: HashMap<GroupId, StudentGroup>,
    students: HashMap<StudentId, Student>,
    group_courses: HashMap<GroupId, Vec<CourseId>>,

    calendar: AcademicCalendar,

    assignments: HashMap<AssignmentId, Assignment>,

    // Tokens keyed by nonce; only the nonce in `active_token` resolves.
    tokens: HashMap<String, AttendanceToken>,
    active_token: HashMap<StudentId, String>,
    records: HashMap<(StudentId, ClassInstanceId), AttendanceRecord>,
    authorised_markers: HashSet<TeacherId>,

    next_assignment_id: i64,
    generation: u64,

    is_healthy: bool,
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData {
                is_healthy: true,
                next_assignment_id: 1,
                ..Default::default()
            })),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write().unwrap();
        data.is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write().unwrap();
        *data = LocalData {
            is_healthy: data.is_healthy,
            next_assignment_id: 1,
            generation: data.generation + 1,
            ..Default::default()
        };
    }

    // ==================== Seeding helpers ====================
    //
    // Entity records are externally managed in production; these helpers
    // stand in for that collaborator when setting up tests and demos. Every
    // mutation bumps the generation counter so caches re-derive.

    pub fn add_course(&self, course: Course) {
        let mut data = self.data.write().unwrap();
        data.courses.insert(course.id, course);
        data.generation += 1;
    }

    pub fn add_teacher(&self, teacher: Teacher) {
        let mut data = self.data.write().unwrap();
        data.teachers.insert(teacher.id, teacher);
        data.generation += 1;
    }

    pub fn add_classroom(&self, classroom: Classroom) {
        let mut data = self.data.write().unwrap();
        data.classrooms.insert(classroom.id, classroom);
        data.generation += 1;
    }

    pub fn add_time_slot(&self, slot: TimeSlot) {
        let mut data = self.data.write().unwrap();
        data.time_slots.insert(slot.id, slot);
        data.generation += 1;
    }

    /// Register a group together with its course list.
    pub fn add_student_group(&self, group: StudentGroup, courses: &[CourseId]) {
        let mut data = self.data.write().unwrap();
        data.group_courses.insert(group.id, courses.to_vec());
        data.groups.insert(group.id, group);
        data.generation += 1;
    }

    pub fn add_student(&self, student: Student) {
        let mut data = self.data.write().unwrap();
        data.students.insert(student.id, student);
        data.generation += 1;
    }

    pub fn add_academic_year(&self, year: AcademicYear) {
        let mut data = self.data.write().unwrap();
        data.calendar.years.push(year);
        data.generation += 1;
    }

    pub fn add_session(&self, session: AcademicSession) {
        let mut data = self.data.write().unwrap();
        data.calendar.sessions.push(session);
        data.generation += 1;
    }

    pub fn add_holiday(&self, holiday: Holiday) {
        let mut data = self.data.write().unwrap();
        data.calendar.holidays.push(holiday);
        data.generation += 1;
    }

    /// Grant `marker` the opaque "may mark any class" role.
    pub fn authorise_marker(&self, marker: TeacherId) {
        let mut data = self.data.write().unwrap();
        data.authorised_markers.insert(marker);
    }

    /// Number of assignments currently stored.
    pub fn assignment_count(&self) -> usize {
        self.data.read().unwrap().assignments.len()
    }

    /// Number of attendance records currently stored.
    pub fn record_count(&self) -> usize {
        self.data.read().unwrap().records.len()
    }

    // ==================== Internal helpers ====================

    fn check_health(&self) -> RepositoryResult<()> {
        let data = self.data.read().unwrap();
        if !data.is_healthy {
            return Err(RepositoryError::ConnectionError(
                "Repository is not healthy".to_string(),
            ));
        }
        Ok(())
    }

    fn lookup<K, V>(
        &self,
        map_accessor: impl FnOnce(&LocalData) -> &HashMap<K, V>,
        key: K,
        kind: &str,
    ) -> RepositoryResult<V>
    where
        K: std::hash::Hash + Eq + std::fmt::Display + Copy,
        V: Clone,
    {
        let data = self.data.read().unwrap();
        map_accessor(&data)
            .get(&key)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("{} {} not found", kind, key)))
    }

    fn require_group(&self, group: GroupId) -> RepositoryResult<()> {
        let data = self.data.read().unwrap();
        if data.groups.contains_key(&group) {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(format!(
                "Student group {} not found",
                group
            )))
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self.data.read().unwrap();
        Ok(data.is_healthy)
    }

    async fn course(&self, id: CourseId) -> RepositoryResult<Course> {
        self.lookup(|d| &d.courses, id, "Course")
    }

    async fn teacher(&self, id: TeacherId) -> RepositoryResult<Teacher> {
        self.lookup(|d| &d.teachers, id, "Teacher")
    }

    async fn classroom(&self, id: RoomId) -> RepositoryResult<Classroom> {
        self.lookup(|d| &d.classrooms, id, "Classroom")
    }

    async fn time_slot(&self, id: SlotId) -> RepositoryResult<TimeSlot> {
        self.lookup(|d| &d.time_slots, id, "Time slot")
    }

    async fn student_group(&self, id: GroupId) -> RepositoryResult<StudentGroup> {
        self.lookup(|d| &d.groups, id, "Student group")
    }

    async fn student(&self, id: StudentId) -> RepositoryResult<Student> {
        self.lookup(|d| &d.students, id, "Student")
    }

    async fn list_courses(&self) -> RepositoryResult<Vec<Course>> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        Ok(data.courses.values().cloned().collect())
    }

    async fn list_teachers(&self) -> RepositoryResult<Vec<Teacher>> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        Ok(data.teachers.values().cloned().collect())
    }

    async fn list_classrooms(&self) -> RepositoryResult<Vec<Classroom>> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        Ok(data.classrooms.values().cloned().collect())
    }

    async fn list_time_slots(&self) -> RepositoryResult<Vec<TimeSlot>> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        Ok(data.time_slots.values().cloned().collect())
    }

    async fn list_student_groups(&self) -> RepositoryResult<Vec<StudentGroup>> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        Ok(data.groups.values().cloned().collect())
    }

    async fn courses_for_group(&self, group: GroupId) -> RepositoryResult<Vec<Course>> {
        self.require_group(group)?;
        let data = self.data.read().unwrap();
        let ids = data.group_courses.get(&group).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| data.courses.get(id).cloned())
            .collect())
    }

    async fn students_in_group(&self, group: GroupId) -> RepositoryResult<Vec<Student>> {
        self.require_group(group)?;
        let data = self.data.read().unwrap();
        let mut students: Vec<Student> = data
            .students
            .values()
            .filter(|s| s.group == group)
            .cloned()
            .collect();
        students.sort_by_key(|s| s.id);
        Ok(students)
    }

    async fn academic_calendar(&self) -> RepositoryResult<AcademicCalendar> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        Ok(data.calendar.clone())
    }
}

#[async_trait]
impl AssignmentRepository for LocalRepository {
    async fn assignment(&self, id: AssignmentId) -> RepositoryResult<Assignment> {
        self.lookup(|d| &d.assignments, id, "Assignment")
    }

    async fn assignments(&self) -> RepositoryResult<Vec<Assignment>> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        let mut all: Vec<Assignment> = data.assignments.values().cloned().collect();
        all.sort_by_key(|a| a.id);
        Ok(all)
    }

    async fn assignments_for_group(&self, group: GroupId) -> RepositoryResult<Vec<Assignment>> {
        let data = self.data.read().unwrap();
        let mut list: Vec<Assignment> = data
            .assignments
            .values()
            .filter(|a| a.group == group)
            .cloned()
            .collect();
        list.sort_by_key(|a| a.id);
        Ok(list)
    }

    async fn assignments_for_teacher(
        &self,
        teacher: TeacherId,
    ) -> RepositoryResult<Vec<Assignment>> {
        let data = self.data.read().unwrap();
        let mut list: Vec<Assignment> = data
            .assignments
            .values()
            .filter(|a| a.teacher == teacher)
            .cloned()
            .collect();
        list.sort_by_key(|a| a.id);
        Ok(list)
    }

    async fn replace_assignments(
        &self,
        groups: &[GroupId],
        assignments: Vec<Assignment>,
    ) -> RepositoryResult<usize> {
        self.check_health()?;
        let group_set: HashSet<GroupId> = groups.iter().copied().collect();
        if let Some(stray) = assignments.iter().find(|a| !group_set.contains(&a.group)) {
            return Err(RepositoryError::ValidationError(format!(
                "Assignment for group {} outside the replaced set",
                stray.group
            )));
        }

        // Single write lock: removal and install are one transactional unit.
        let mut data = self.data.write().unwrap();
        data.assignments.retain(|_, a| !group_set.contains(&a.group));

        let installed = assignments.len();
        for mut assignment in assignments {
            let id = AssignmentId::new(data.next_assignment_id);
            data.next_assignment_id += 1;
            assignment.id = id;
            data.assignments.insert(id, assignment);
        }

        data.generation += 1;
        Ok(installed)
    }

    async fn generation(&self) -> RepositoryResult<u64> {
        let data = self.data.read().unwrap();
        Ok(data.generation)
    }
}

#[async_trait]
impl AttendanceRepository for LocalRepository {
    async fn put_token(&self, token: AttendanceToken) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();

        // Supersede: the previous active token stops resolving entirely.
        if let Some(old_nonce) = data.active_token.remove(&token.student) {
            data.tokens.remove(&old_nonce);
        }

        data.active_token
            .insert(token.student, token.nonce.clone());
        data.tokens.insert(token.nonce.clone(), token);
        Ok(())
    }

    async fn token_by_nonce(&self, nonce: &str) -> RepositoryResult<Option<AttendanceToken>> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        Ok(data.tokens.get(nonce).cloned())
    }

    async fn commit_scan(&self, record: AttendanceRecord, nonce: &str) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();

        let key = (record.student, record.instance);
        if data.records.contains_key(&key) {
            return Err(RepositoryError::Conflict(format!(
                "Attendance for student {} at {} already recorded",
                record.student, record.instance
            )));
        }

        data.records.insert(key, record);
        if let Some(token) = data.tokens.get_mut(nonce) {
            token.consumed = true;
        }
        Ok(())
    }

    async fn records_for_instance(
        &self,
        instance: &ClassInstanceId,
    ) -> RepositoryResult<Vec<AttendanceRecord>> {
        let data = self.data.read().unwrap();
        let mut records: Vec<AttendanceRecord> = data
            .records
            .values()
            .filter(|r| r.instance == *instance)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.student);
        Ok(records)
    }

    async fn append_absences(&self, records: Vec<AttendanceRecord>) -> RepositoryResult<usize> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let mut inserted = 0;
        for record in records {
            let key = (record.student, record.instance);
            if !data.records.contains_key(&key) {
                data.records.insert(key, record);
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn is_authorised_marker(&self, marker: TeacherId) -> RepositoryResult<bool> {
        let data = self.data.read().unwrap();
        Ok(data.authorised_markers.contains(&marker))
    }
}
