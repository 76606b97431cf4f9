//! Account creation and credential checks. Passwords are compared as stored.

use super::book::{PlacementBook, UnitOfWork};
use super::domain::{
    Actor, CompanyRepresentative, RepresentativeRegistration, Staff, Student,
};
use super::outcome::{Outcome, Refusal};

pub(crate) fn register_student(work: &mut UnitOfWork<'_>, student: Student) -> Outcome<Student> {
    if work.book().account_exists(student.id.as_str()) {
        return Refusal::DuplicateId.into();
    }
    if student.year_of_study == 0 {
        return Refusal::InvalidYearOfStudy.into();
    }
    if student.password.trim().is_empty() {
        return Refusal::BlankPassword.into();
    }

    work.insert(student.clone());
    Outcome::Applied(student)
}

/// New representatives wait in the staff review queue until approved.
pub(crate) fn register_representative(
    work: &mut UnitOfWork<'_>,
    registration: RepresentativeRegistration,
) -> Outcome<CompanyRepresentative> {
    if work.book().account_exists(registration.id.as_str()) {
        return Refusal::DuplicateId.into();
    }
    if registration.password.trim().is_empty() {
        return Refusal::BlankPassword.into();
    }

    let representative = CompanyRepresentative {
        id: registration.id,
        name: registration.name,
        password: registration.password,
        company_name: registration.company_name,
        department: registration.department,
        position: registration.position,
        email: registration.email,
        approved: false,
    };
    work.insert(representative.clone());
    Outcome::Applied(representative)
}

/// Resolves an id and password to the acting role. Unknown ids and wrong passwords are
/// indistinguishable to the caller.
pub(crate) fn login(book: &PlacementBook, id: &str, password: &str) -> Outcome<Actor> {
    if let Some(student) = book.get::<Student>(id) {
        return credential(&student.password, password, Actor::Student(student.id.clone()));
    }
    if let Some(staff) = book.get::<Staff>(id) {
        return credential(&staff.password, password, Actor::Staff(staff.id.clone()));
    }
    if let Some(representative) = book.get::<CompanyRepresentative>(id) {
        if representative.password != password {
            return Refusal::InvalidCredentials.into();
        }
        if !representative.approved {
            return Refusal::RepresentativeNotApproved.into();
        }
        return Outcome::Applied(Actor::Representative(representative.id.clone()));
    }
    Refusal::InvalidCredentials.into()
}

fn credential(stored: &str, offered: &str, actor: Actor) -> Outcome<Actor> {
    if stored == offered {
        Outcome::Applied(actor)
    } else {
        Refusal::InvalidCredentials.into()
    }
}

pub(crate) fn change_password(
    work: &mut UnitOfWork<'_>,
    actor: &Actor,
    current: &str,
    replacement: &str,
) -> Outcome<()> {
    if replacement.trim().is_empty() {
        return Refusal::BlankPassword.into();
    }

    let book = work.book();
    match actor {
        Actor::Student(id) => match book.student(id) {
            Some(student) if student.password == current => {
                let mut student = student.clone();
                student.password = replacement.to_string();
                work.save(student);
            }
            _ => return Refusal::InvalidCredentials.into(),
        },
        Actor::Representative(id) => match book.representative(id) {
            Some(representative) if representative.password == current => {
                let mut representative = representative.clone();
                representative.password = replacement.to_string();
                work.save(representative);
            }
            _ => return Refusal::InvalidCredentials.into(),
        },
        Actor::Staff(id) => match book.staff_member(id) {
            Some(staff) if staff.password == current => {
                let mut staff = staff.clone();
                staff.password = replacement.to_string();
                work.save(staff);
            }
            _ => return Refusal::InvalidCredentials.into(),
        },
    }

    Outcome::Applied(())
}
