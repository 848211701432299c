//! Trajectory graph container: owns poses and kinematics terms, plus the
//! relation tables between them.
//!
//! The back-reference model is explicit: instead of terms erasing themselves
//! from vertex edge lists in a destructor, the container keeps a
//! pose-to-incident-terms table and runs the teardown on
//! [`TrajectoryGraph::remove_term`]. Poses are owned solely by the container;
//! removing a term never deallocates a pose.

use std::collections::{BTreeSet, HashMap};
use std::io::{Read, Write};

use nalgebra::{Matrix2x3, Vector2};

use crate::core::pose::Pose;
use crate::error::{KinematicsError, KinematicsResult};
use crate::factors::KinematicTerm;

/// Stable handle of a pose in the trajectory graph.
pub type PoseId = usize;

/// Stable handle of a kinematics term in the trajectory graph.
pub type TermId = usize;

/// Container for a discretized trajectory and its kinematic cost terms.
///
/// The external least-squares solver mutates poses through
/// [`TrajectoryGraph::pose_mut`] between iterations; term evaluation reads
/// them through the accessors here.
#[derive(Default)]
pub struct TrajectoryGraph {
    poses: HashMap<PoseId, Pose>,
    terms: HashMap<TermId, Box<dyn KinematicTerm>>,
    incident: HashMap<PoseId, BTreeSet<TermId>>,
    pose_ordering: Vec<PoseId>,
    term_ordering: Vec<TermId>,
    next_pose_id: PoseId,
    next_term_id: TermId,
}

impl TrajectoryGraph {
    /// Creates a new, empty trajectory graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pose and return its handle.
    pub fn add_pose(&mut self, pose: Pose) -> PoseId {
        let id = self.next_pose_id;
        self.next_pose_id += 1;
        self.pose_ordering.push(id);
        self.poses.insert(id, pose);
        self.incident.insert(id, BTreeSet::new());
        id
    }

    /// Get a pose by handle.
    pub fn pose(&self, id: PoseId) -> Option<&Pose> {
        self.poses.get(&id)
    }

    /// Get a mutable pose by handle (solver-side estimate updates).
    pub fn pose_mut(&mut self, id: PoseId) -> Option<&mut Pose> {
        self.poses.get_mut(&id)
    }

    /// Add a term, validating its pose handles and registering it in both
    /// incidence sets.
    pub fn add_term(&mut self, term: Box<dyn KinematicTerm>) -> KinematicsResult<TermId> {
        for pose_id in term.pose_keys() {
            if !self.poses.contains_key(&pose_id) {
                return Err(KinematicsError::Graph(format!(
                    "term references non-existent pose {pose_id}"
                )));
            }
        }

        let id = self.next_term_id;
        self.next_term_id += 1;
        for pose_id in term.pose_keys() {
            // Entry exists for every live pose
            if let Some(incident) = self.incident.get_mut(&pose_id) {
                incident.insert(id);
            }
        }
        self.term_ordering.push(id);
        self.terms.insert(id, term);
        Ok(id)
    }

    /// Remove a term: the teardown hook erases it from both referenced
    /// poses' incident-term sets and returns the boxed term. The poses
    /// themselves remain intact and usable.
    pub fn remove_term(&mut self, id: TermId) -> KinematicsResult<Box<dyn KinematicTerm>> {
        let term = self
            .terms
            .remove(&id)
            .ok_or_else(|| KinematicsError::Graph(format!("term {id} does not exist")))?;
        for pose_id in term.pose_keys() {
            if let Some(incident) = self.incident.get_mut(&pose_id) {
                incident.remove(&id);
            }
        }
        self.term_ordering.retain(|&t| t != id);
        Ok(term)
    }

    /// Remove a pose. Refused while any term still references it; remove the
    /// incident terms first.
    pub fn remove_pose(&mut self, id: PoseId) -> KinematicsResult<Pose> {
        match self.incident.get(&id) {
            None => {
                return Err(KinematicsError::Graph(format!(
                    "pose {id} does not exist"
                )))
            }
            Some(incident) if !incident.is_empty() => {
                return Err(KinematicsError::Graph(format!(
                    "cannot remove pose {id}: still referenced by terms {incident:?}"
                )))
            }
            Some(_) => {}
        }
        self.incident.remove(&id);
        self.pose_ordering.retain(|&p| p != id);
        // Unwrap-free: the incident entry proved the pose exists
        self.poses
            .remove(&id)
            .ok_or_else(|| KinematicsError::Graph(format!("pose {id} does not exist")))
    }

    /// Get a term by handle.
    pub fn term(&self, id: TermId) -> Option<&dyn KinematicTerm> {
        self.terms.get(&id).map(|t| t.as_ref())
    }

    /// Get a mutable term by handle (information updates, stream reads).
    pub fn term_mut(&mut self, id: TermId) -> Option<&mut Box<dyn KinematicTerm>> {
        self.terms.get_mut(&id)
    }

    /// Handles of the terms incident to a pose.
    pub fn incident_terms(&self, pose_id: PoseId) -> KinematicsResult<&BTreeSet<TermId>> {
        self.incident
            .get(&pose_id)
            .ok_or_else(|| KinematicsError::Graph(format!("pose {pose_id} does not exist")))
    }

    /// All pose handles in insertion order.
    pub fn pose_ids(&self) -> &[PoseId] {
        &self.pose_ordering
    }

    /// All term handles in insertion order.
    pub fn term_ids(&self) -> &[TermId] {
        &self.term_ordering
    }

    pub fn num_poses(&self) -> usize {
        self.poses.len()
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    fn term_and_poses(
        &self,
        id: TermId,
    ) -> KinematicsResult<(&dyn KinematicTerm, &Pose, &Pose)> {
        let term = self
            .term(id)
            .ok_or_else(|| KinematicsError::Graph(format!("term {id} does not exist")))?;
        let [key1, key2] = term.pose_keys();
        let pose1 = self
            .pose(key1)
            .ok_or_else(|| KinematicsError::Graph(format!("pose {key1} does not exist")))?;
        let pose2 = self
            .pose(key2)
            .ok_or_else(|| KinematicsError::Graph(format!("pose {key2} does not exist")))?;
        Ok((term, pose1, pose2))
    }

    /// Recompute the residual of one term from the current pose estimates.
    pub fn term_error(&self, id: TermId) -> KinematicsResult<Vector2<f64>> {
        let (term, pose1, pose2) = self.term_and_poses(id)?;
        Ok(term.compute_error(pose1, pose2))
    }

    /// Analytic Jacobian blocks of one term, `None` when the term leaves
    /// differentiation to the solver.
    pub fn linearize_term(
        &self,
        id: TermId,
    ) -> KinematicsResult<Option<[Matrix2x3<f64>; 2]>> {
        let (term, pose1, pose2) = self.term_and_poses(id)?;
        Ok(term.linearize_oplus(pose1, pose2))
    }

    /// Total weighted squared error over all terms: `sum r^T W r`.
    pub fn total_error(&self) -> KinematicsResult<f64> {
        let mut total = 0.0;
        for &id in &self.term_ordering {
            let (term, pose1, pose2) = self.term_and_poses(id)?;
            let residual = term.compute_error(pose1, pose2);
            let weighted = term.information() * &residual;
            total += residual.dot(&weighted);
        }
        Ok(total)
    }

    /// Feed a term its persisted fields from a stream.
    pub fn read_term(&mut self, id: TermId, reader: &mut dyn Read) -> KinematicsResult<()> {
        let term = self
            .terms
            .get_mut(&id)
            .ok_or_else(|| KinematicsError::Graph(format!("term {id} does not exist")))?;
        term.read(reader)
    }

    /// Emit a term's diagnostic fields to a stream.
    pub fn write_term(&self, id: TermId, writer: &mut dyn Write) -> KinematicsResult<()> {
        let (term, pose1, pose2) = self.term_and_poses(id)?;
        term.write(pose1, pose2, writer)
    }
}
