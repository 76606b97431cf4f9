use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use internship_hub::error::AppError;
use internship_hub::storage::{Entity, MemoryStore, Record};
use internship_hub::workflows::placement::{
    ApplicationId, InternshipLevel, Outcome, PlacementError, PlacementPolicy, PlacementService,
    PostingDraft, RepresentativeId, RepresentativeRegistration, Staff, StaffId, Student,
    StudentFilter, StudentId,
};
use std::fmt::Debug;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date used for applications (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

type DemoService = PlacementService<MemoryStore>;

fn demo_accounts() -> Vec<Record> {
    let student = |id: &str, name: &str, major: &str, year_of_study: u8| Student {
        id: StudentId::from(id),
        name: name.to_string(),
        password: "password".to_string(),
        major: major.to_string(),
        year_of_study,
        email: format!("{}@campus.example", id.to_lowercase()),
    };

    vec![
        Staff {
            id: StaffId::from("career-01"),
            name: "Morgan Lee".to_string(),
            password: "password".to_string(),
            role: "Placement Officer".to_string(),
            department: "Career Office".to_string(),
            email: "career-01@campus.example".to_string(),
        }
        .into_record(),
        student("U2310001A", "Avery Stone", "Computer Science", 3).into_record(),
        student("U2310002B", "Blake Hart", "Computer Science", 1).into_record(),
    ]
}

fn draft(title: &str, level: InternshipLevel, slots: u8, today: NaiveDate) -> PostingDraft {
    PostingDraft {
        title: title.to_string(),
        description: format!("{title} with the Northwind platform team"),
        level,
        preferred_major: Some("Computer Science".to_string()),
        opening_date: today,
        closing_date: today + Duration::days(30),
        slots,
    }
}

/// Prints one step and hands back the applied value, if any.
fn step<T: Debug>(
    label: &str,
    result: Result<Outcome<T>, PlacementError>,
) -> Result<Option<T>, AppError> {
    match result? {
        Outcome::Applied(value) => {
            println!("  [ok]      {label}");
            Ok(Some(value))
        }
        Outcome::Refused(refusal) => {
            println!("  [refused] {label}: {}", refusal.summary());
            Ok(None)
        }
    }
}

fn print_applications(service: &DemoService, student: &StudentId) -> Result<(), AppError> {
    for application in service.student_applications(student)? {
        println!(
            "    {} -> {} [{}{}{}]",
            application.id,
            application.internship_id,
            application.status.label(),
            if application.student_accepted { ", accepted" } else { "" },
            if application.withdraw_requested { ", withdrawal requested" } else { "" },
        );
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let store = Arc::new(MemoryStore::with_records(demo_accounts()));
    let service = PlacementService::open(store, PlacementPolicy::default())?;

    let staff = StaffId::from("career-01");
    let rep = RepresentativeId::from("talent@northwind.example");
    let senior = StudentId::from("U2310001A");
    let junior = StudentId::from("U2310002B");

    println!("Internship placement demo ({today})");

    println!("\nRegistration and review");
    step(
        "Northwind representative registers",
        service.register_representative(RepresentativeRegistration {
            id: rep.clone(),
            name: "Riley Chen".to_string(),
            password: "password".to_string(),
            company_name: "Northwind".to_string(),
            department: "Engineering".to_string(),
            position: "University Recruiter".to_string(),
            email: rep.to_string(),
        }),
    )?;
    step(
        "representative logs in before approval",
        service.login(rep.as_str(), "password"),
    )?;
    step(
        "staff approve the representative",
        service.approve_representative(&staff, &rep),
    )?;
    step(
        "representative logs in",
        service.login(rep.as_str(), "password"),
    )?;

    println!("\nPostings");
    let mut postings = Vec::new();
    for (title, level, slots) in [
        ("Platform Intern", InternshipLevel::Basic, 1),
        ("Compiler Intern", InternshipLevel::Advanced, 2),
    ] {
        if let Some(posting) = step(
            &format!("create '{title}' ({slots} slot(s))"),
            service.create_posting(&rep, draft(title, level, slots, today)),
        )? {
            step(
                &format!("staff approve {}", posting.id),
                service.approve_posting(&staff, &posting.id),
            )?;
            postings.push(posting.id);
        }
    }
    let [basic, advanced] = postings.as_slice() else {
        println!("postings were not created; stopping");
        return Ok(());
    };

    let open = service.student_internships(&senior, &StudentFilter::default())?;
    println!("  {} posting(s) open to students", open.len());

    println!("\nApplications");
    step(
        "junior applies to the advanced posting",
        service.apply(&junior, advanced, today),
    )?;
    let junior_application = step(
        "junior applies to the basic posting",
        service.apply(&junior, basic, today),
    )?;
    let first = step(
        "senior applies to the basic posting",
        service.apply(&senior, basic, today),
    )?;
    let second = step(
        "senior applies to the advanced posting",
        service.apply(&senior, advanced, today),
    )?;

    println!("\nOffers");
    let (Some(first), Some(second)) = (first, second) else {
        println!("senior applications were refused; stopping");
        return Ok(());
    };
    step(
        "representative approves the basic application",
        service.approve_application(&rep, &first.id),
    )?;
    step(
        "representative approves the advanced application",
        service.approve_application(&rep, &second.id),
    )?;
    if let Some(acceptance) = step(
        "senior accepts the basic offer",
        service.accept_offer(&senior, &first.id),
    )? {
        println!(
            "    {} is now {} ({}/{} slots); withdrew {:?}",
            acceptance.internship.id,
            acceptance.internship.status.label(),
            acceptance.internship.accepted_count(),
            acceptance.internship.slots,
            acceptance.withdrawn,
        );
    }
    if let Some(application) = junior_application {
        step(
            "representative approves the junior (posting is full)",
            service.approve_application(&rep, &application.id),
        )?;
    }
    print_applications(&service, &senior)?;

    println!("\nWithdrawal");
    withdraw(&service, &staff, &senior, &first.id)?;
    print_applications(&service, &senior)?;
    let reopened = service.student_internships(&senior, &StudentFilter::default())?;
    println!("  {} posting(s) open to students", reopened.len());

    Ok(())
}

fn withdraw(
    service: &DemoService,
    staff: &StaffId,
    student: &StudentId,
    application: &ApplicationId,
) -> Result<(), AppError> {
    step(
        "senior requests withdrawal of the accepted offer",
        service.request_withdrawal(student, application),
    )?;
    println!(
        "    {} request(s) awaiting staff",
        service.pending_withdrawals(staff)?.len()
    );
    step(
        "staff approve the withdrawal",
        service.approve_withdrawal(staff, application),
    )?;
    Ok(())
}
