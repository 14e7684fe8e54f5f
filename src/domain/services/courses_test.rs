use anyhow::Result;

use super::derive_course_name;
use crate::domain::models::CourseResolution;
use crate::domain::models::Event;
use crate::domain::models::MessageType;
use crate::domain::models::TranscriptItem;
use crate::domain::services::test_backend::course;
use crate::domain::services::test_backend::harness;
use crate::domain::services::test_backend::profile;
use crate::domain::services::test_backend::Script;
use crate::domain::services::StoreKey;

mod course_names {
    use super::*;

    #[test]
    fn it_keeps_the_whole_base_when_a_keyword_leads() {
        let name = derive_course_name("Lecture3_Intro_to_Physics.pptx");
        insta::assert_snapshot!(name, @"Lecture3 Intro To Physics");
        assert_eq!(derive_course_name("Lecture3_Intro_to_Physics.pptx"), name);
    }

    #[test]
    fn it_keeps_week_prefixed_names() {
        assert_eq!(derive_course_name("Week1.pptx"), "Week1");
    }

    #[test]
    fn it_cuts_at_the_first_digit() {
        assert_eq!(derive_course_name("Physics101_Lecture_4.pptx"), "Physics");
    }

    #[test]
    fn it_cuts_at_the_first_keyword() {
        assert_eq!(
            derive_course_name("intro-to--CHEMISTRY chapter 2.pdf"),
            "Intro To Chemistry"
        );
    }

    #[test]
    fn it_handles_names_without_an_extension() {
        assert_eq!(derive_course_name("organic_notes"), "Organic Notes");
    }

    #[test]
    fn it_returns_nothing_for_hidden_files() {
        assert_eq!(derive_course_name(".pptx"), "");
    }
}

mod refresh_courses {
    use super::*;

    #[tokio::test]
    async fn it_does_nothing_for_guests() -> Result<()> {
        let h = harness(Script::default());
        h.orch.refresh_courses().await?;

        assert!(h.backend.calls().is_empty());

        return Ok(());
    }

    #[tokio::test]
    async fn it_falls_back_when_the_selection_vanished() -> Result<()> {
        let h = harness(Script {
            courses: vec![course(3, "Physics"), course(4, "Chemistry")],
            ..Script::default()
        });
        h.sign_in();
        h.orch.state().courses.selected = Some(9);

        h.orch.refresh_courses().await?;

        assert_eq!(h.orch.state().courses.selected, Some(3));
        assert_eq!(h.orch.store().get(StoreKey::SelectedCourse), Some("3".to_string()));
        assert_eq!(h.backend.count("list_summaries:3"), 1);
        assert_eq!(h.backend.count("list_study_items:"), 2);

        return Ok(());
    }

    #[tokio::test]
    async fn it_clears_summaries_when_no_course_remains() -> Result<()> {
        let mut h = harness(Script::default());
        h.sign_in();
        h.orch.state().courses.selected = Some(9);

        h.orch.refresh_courses().await?;

        assert_eq!(h.orch.state().courses.selected, None);
        assert_eq!(h.backend.count("list_summaries"), 0);
        assert_eq!(h.orch.store().get(StoreKey::SelectedCourse), None);
        assert!(h.events().contains(&Event::SummariesChanged(vec![])));

        return Ok(());
    }

    #[tokio::test]
    async fn it_drops_a_list_fetched_for_the_previous_user() -> Result<()> {
        let mut h = harness(Script {
            courses: vec![course(3, "Physics")],
            ..Script::default()
        });
        h.sign_in();
        let (started, release) = h.backend.pause_next("list_courses");

        let orch = h.orch.clone();
        let run = tokio::spawn(async move {
            return orch.refresh_courses().await;
        });
        started.notified().await;

        {
            let mut script = h.backend.script.lock().unwrap();
            script.courses = vec![course(8, "History")];
            script.identity = Some(profile("grace@example.com"));
            script.login_token = Some("xyz".to_string());
        }
        h.orch.logout();
        h.orch.login("grace@example.com", "pw").await?;
        assert_eq!(h.orch.state().courses.selected, Some(8));

        release.notify_one();
        run.await??;

        let state = h.orch.state();
        assert_eq!(state.courses.courses, vec![course(8, "History")]);
        assert_eq!(state.courses.selected, Some(8));
        drop(state);
        assert_eq!(h.orch.store().get(StoreKey::SelectedCourse), Some("8".to_string()));
        assert_eq!(h.backend.count("list_courses:abc"), 1);
        assert_eq!(h.backend.count("list_summaries:3"), 0);
        assert!(!h.events().iter().any(|event| {
            return matches!(event, Event::CoursesChanged(courses, _) if courses.contains(&course(3, "Physics")));
        }));

        return Ok(());
    }
}

mod select_course {
    use super::*;

    #[tokio::test]
    async fn it_rejects_guests_without_network() {
        let h = harness(Script::default());

        assert!(h.orch.select_course(Some(3)).await.is_err());
        assert!(h.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn it_rejects_unknown_courses() {
        let h = harness(Script::default());
        h.sign_in();

        assert!(h.orch.select_course(Some(42)).await.is_err());
        assert!(h.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn it_selects_and_loads_artifacts() -> Result<()> {
        let h = harness(Script::default());
        h.sign_in();
        h.select(course(3, "Physics"));
        h.orch.state().courses.courses.push(course(4, "Chemistry"));

        h.orch.select_course(Some(4)).await?;

        assert_eq!(h.orch.state().courses.selected, Some(4));
        assert_eq!(
            h.backend.calls(),
            vec![
                "list_summaries:4".to_string(),
                "list_study_items:quiz:4".to_string(),
                "list_study_items:assignment:4".to_string(),
            ]
        );

        return Ok(());
    }

    #[tokio::test]
    async fn it_clears_the_selection() -> Result<()> {
        let h = harness(Script::default());
        h.sign_in();
        h.select(course(3, "Physics"));

        h.orch.select_course(None).await?;

        assert_eq!(h.orch.state().courses.selected, None);
        assert!(h.backend.calls().is_empty());

        return Ok(());
    }
}

mod create_course {
    use super::*;

    #[tokio::test]
    async fn it_requires_a_name() {
        let h = harness(Script::default());
        h.sign_in();

        assert!(h.orch.create_course("  ", None).await.is_err());
        assert!(h.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn it_appends_and_selects_the_new_course() -> Result<()> {
        let h = harness(Script::default());
        h.sign_in();

        let created = h.orch.create_course("Astronomy", Some("Science")).await?;

        assert_eq!(created.display_name(), "Astronomy · Science");
        let state = h.orch.state();
        assert_eq!(state.courses.selected, Some(created.id));
        assert_eq!(state.courses.courses, vec![created]);

        return Ok(());
    }
}

mod auto_resolve_from_filename {
    use super::*;

    #[tokio::test]
    async fn it_skips_guests() {
        let h = harness(Script::default());

        assert!(h.orch.auto_resolve_from_filename("Physics101.pptx").await.is_none());
        assert!(h.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn it_skips_when_a_course_is_selected() {
        let h = harness(Script::default());
        h.sign_in();
        h.select(course(3, "Chemistry"));

        assert!(h.orch.auto_resolve_from_filename("Physics101.pptx").await.is_none());
        assert!(h.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn it_reuses_an_existing_course() {
        let mut h = harness(Script::default());
        h.sign_in();
        h.orch.state().courses.courses.push(course(3, "physics"));

        let resolved = h.orch.auto_resolve_from_filename("Physics101_Lecture_4.pptx").await;

        assert_eq!(resolved, Some(course(3, "physics")));
        assert_eq!(h.orch.state().courses.selected, Some(3));
        assert_eq!(h.backend.count("create_course"), 0);
        assert!(h
            .events()
            .contains(&Event::CourseAutoResolved(course(3, "physics"), CourseResolution::Reused)));
    }

    #[tokio::test]
    async fn it_creates_a_missing_course() {
        let mut h = harness(Script::default());
        h.sign_in();

        let resolved = h.orch.auto_resolve_from_filename("Physics101_Lecture_4.pptx").await;

        let created = resolved.unwrap();
        assert_eq!(created.name, "Physics");
        assert_eq!(h.orch.state().courses.selected, Some(created.id));
        assert_eq!(h.backend.count("create_course:Physics"), 1);
        assert!(h
            .events()
            .contains(&Event::CourseAutoResolved(created, CourseResolution::Created)));
    }

    #[tokio::test]
    async fn it_reports_failures_as_warnings() {
        let h = harness(Script {
            fail_create_course: true,
            ..Script::default()
        });
        h.sign_in();

        assert!(h.orch.auto_resolve_from_filename("Physics101.pptx").await.is_none());
        assert_eq!(h.orch.state().courses.selected, None);
        match h.transcript().last() {
            Some(TranscriptItem::Message(message)) => {
                assert_eq!(message.message_type(), MessageType::Warning);
                assert!(message.text.starts_with("Could not create a course for this deck"));
            }
            other => panic!("unexpected transcript item {other:?}"),
        }
    }
}
