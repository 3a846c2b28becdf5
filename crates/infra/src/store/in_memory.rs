use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use silversport_core::{
    Class, ClassFilter, ClassId, ClassStatus, Enrollment, EnrollmentId, Instructor, Payment, Role,
    User, UserId, most_popular,
};

use super::r#trait::{
    ClassStore, DeleteOutcome, EnrollmentStore, InsertOutcome, InstructorStore, PaymentOrder,
    PaymentStore, StoreError, UpdateOutcome, UserStore,
};

/// In-memory document store.
///
/// Intended for tests/dev. Collections are kept in insertion order, which is
/// the "natural" order listings return.
#[derive(Debug, Default)]
pub struct InMemorySilverStore {
    users: RwLock<Vec<User>>,
    classes: RwLock<Vec<Class>>,
    instructors: RwLock<Vec<Instructor>>,
    enrollments: RwLock<Vec<Enrollment>>,
    payments: RwLock<Vec<Payment>>,
}

impl InMemorySilverStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read().map_err(|_| StoreError::Poisoned)
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write().map_err(|_| StoreError::Poisoned)
}

#[async_trait]
impl UserStore for InMemorySilverStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(read(&self.users)?.clone())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(read(&self.users)?.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: User) -> Result<InsertOutcome, StoreError> {
        let id = user.id;
        write(&self.users)?.push(user);
        Ok(InsertOutcome::inserted(id))
    }

    async fn set_user_role(&self, id: UserId, role: Role) -> Result<UpdateOutcome, StoreError> {
        let mut users = write(&self.users)?;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(UpdateOutcome::unmatched());
        };
        let modified = user.role != Some(role);
        user.role = Some(role);
        Ok(UpdateOutcome::matched(modified))
    }
}

#[async_trait]
impl ClassStore for InMemorySilverStore {
    async fn list_classes(&self, filter: ClassFilter) -> Result<Vec<Class>, StoreError> {
        Ok(filter.apply(read(&self.classes)?.iter()))
    }

    async fn classes_by_instructor(&self, email: &str) -> Result<Vec<Class>, StoreError> {
        Ok(read(&self.classes)?
            .iter()
            .filter(|c| c.instructor_email == email)
            .cloned()
            .collect())
    }

    async fn find_class(&self, id: ClassId) -> Result<Option<Class>, StoreError> {
        Ok(read(&self.classes)?.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_class(&self, class: Class) -> Result<InsertOutcome, StoreError> {
        let id = class.id;
        write(&self.classes)?.push(class);
        Ok(InsertOutcome::inserted(id))
    }

    async fn set_class_status(
        &self,
        id: ClassId,
        status: ClassStatus,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut classes = write(&self.classes)?;
        let Some(class) = classes.iter_mut().find(|c| c.id == id) else {
            return Ok(UpdateOutcome::unmatched());
        };
        let modified = class.status != status;
        class.status = status;
        Ok(UpdateOutcome::matched(modified))
    }

    async fn upsert_class_feedback(
        &self,
        id: ClassId,
        feedback: String,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut classes = write(&self.classes)?;
        match classes.iter_mut().find(|c| c.id == id) {
            Some(class) => {
                let modified = class.feedback.as_deref() != Some(feedback.as_str());
                class.feedback = Some(feedback);
                Ok(UpdateOutcome::matched(modified))
            }
            None => {
                classes.push(Class::feedback_only(id, feedback));
                Ok(UpdateOutcome::upserted(id))
            }
        }
    }

    async fn decrement_class_seats(&self, id: ClassId) -> Result<UpdateOutcome, StoreError> {
        let mut classes = write(&self.classes)?;
        match classes.iter_mut().find(|c| c.id == id) {
            Some(class) => {
                class.take_seat();
                Ok(UpdateOutcome::matched(true))
            }
            None => Ok(UpdateOutcome::unmatched()),
        }
    }
}

#[async_trait]
impl InstructorStore for InMemorySilverStore {
    async fn list_instructors(&self) -> Result<Vec<Instructor>, StoreError> {
        Ok(read(&self.instructors)?.clone())
    }

    async fn popular_instructors(&self, limit: usize) -> Result<Vec<Instructor>, StoreError> {
        Ok(most_popular(read(&self.instructors)?.clone(), limit))
    }

    async fn insert_instructor(&self, instructor: Instructor) -> Result<InsertOutcome, StoreError> {
        let id = instructor.id;
        write(&self.instructors)?.push(instructor);
        Ok(InsertOutcome::inserted(id))
    }
}

#[async_trait]
impl EnrollmentStore for InMemorySilverStore {
    async fn enrollments_by_email(&self, email: &str) -> Result<Vec<Enrollment>, StoreError> {
        Ok(read(&self.enrollments)?
            .iter()
            .filter(|e| e.email == email)
            .cloned()
            .collect())
    }

    async fn find_enrollment(&self, id: EnrollmentId) -> Result<Option<Enrollment>, StoreError> {
        Ok(read(&self.enrollments)?.iter().find(|e| e.id == id).cloned())
    }

    async fn insert_enrollment(&self, enrollment: Enrollment) -> Result<InsertOutcome, StoreError> {
        let id = enrollment.id;
        write(&self.enrollments)?.push(enrollment);
        Ok(InsertOutcome::inserted(id))
    }

    async fn delete_enrollment(&self, id: EnrollmentId) -> Result<DeleteOutcome, StoreError> {
        let mut enrollments = write(&self.enrollments)?;
        match enrollments.iter().position(|e| e.id == id) {
            Some(idx) => {
                enrollments.remove(idx);
                Ok(DeleteOutcome::deleted(1))
            }
            None => Ok(DeleteOutcome::deleted(0)),
        }
    }
}

#[async_trait]
impl PaymentStore for InMemorySilverStore {
    async fn insert_payment(&self, payment: Payment) -> Result<InsertOutcome, StoreError> {
        let id = payment.id;
        write(&self.payments)?.push(payment);
        Ok(InsertOutcome::inserted(id))
    }

    async fn payments_by_email(
        &self,
        email: &str,
        order: PaymentOrder,
    ) -> Result<Vec<Payment>, StoreError> {
        let mut out: Vec<Payment> = read(&self.payments)?
            .iter()
            .filter(|p| p.email == email)
            .cloned()
            .collect();
        if order == PaymentOrder::NewestFirst {
            out.sort_by(|a, b| b.date.cmp(&a.date));
        }
        Ok(out)
    }
}
