use std::sync::Arc;

use domain_ingest::{
    command::OpenUploadCommand,
    exception::UploadException,
    mock::{MockAssemblyEngine, MockChunkStore, MockSessionRegistry, MockUploadEventNotifier},
    model::{
        entity::{ChunkRecord, SessionState, UploadSession},
        vo::{
            AssembleOutcome, AssemblyClaim, BlobHandle, HashAlgorithm, IncomingChunk,
            RecordOutcome, SubmitOutcome, UploadEvent,
        },
    },
    service::{AssemblyEngine, UploadCoordinator},
};
use service_ingest::{AssemblyEngineImpl, UploadCoordinatorImpl};

fn open_session(content: &[u8], chunk_count: u64) -> UploadSession {
    UploadSession::open(
        OpenUploadCommand {
            declared_size: content.len() as u64,
            chunk_count,
            checksum: HashAlgorithm::Blake3.digest(content),
        },
        HashAlgorithm::Blake3,
    )
}

fn chunk_of(session: &UploadSession, index: u64, content: &[u8]) -> IncomingChunk {
    IncomingChunk {
        session_id: session.id,
        index,
        content: content.to_vec(),
        checksum: HashAlgorithm::Blake3.digest(content),
    }
}

fn coordinator(
    registry: MockSessionRegistry,
    chunk_store: MockChunkStore,
    assembly_engine: MockAssemblyEngine,
    notifier: MockUploadEventNotifier,
) -> UploadCoordinatorImpl {
    UploadCoordinatorImpl::builder()
        .registry(Arc::new(registry))
        .chunk_store(Arc::new(chunk_store))
        .assembly_engine(Arc::new(assembly_engine))
        .notifier(Arc::new(notifier))
        .build()
}

#[tokio::test]
async fn bad_declarations_are_rejected_before_any_state_change() {
    let bad = [
        OpenUploadCommand {
            declared_size: 0,
            chunk_count: 1,
            checksum: "ab".into(),
        },
        OpenUploadCommand {
            declared_size: 100,
            chunk_count: 0,
            checksum: "ab".into(),
        },
        OpenUploadCommand {
            declared_size: 2,
            chunk_count: 3,
            checksum: "ab".into(),
        },
        OpenUploadCommand {
            declared_size: 100,
            chunk_count: 1,
            checksum: "not-hex!".into(),
        },
    ];
    // No expectations: any registry or store call would fail the test.
    let coordinator = coordinator(
        MockSessionRegistry::new(),
        MockChunkStore::new(),
        MockAssemblyEngine::new(),
        MockUploadEventNotifier::new(),
    );
    for cmd in bad {
        let err = coordinator.open_upload(cmd).await.unwrap_err();
        assert!(matches!(err, UploadException::InvalidDeclaration { .. }));
    }
}

#[tokio::test]
async fn corrupt_chunk_is_never_persisted() {
    let session = open_session(b"0123456789", 2);
    let mut registry = MockSessionRegistry::new();
    let snapshot = session.clone();
    registry.expect_get().returning(move |_| Ok(snapshot.clone()));

    let mut chunk = chunk_of(&session, 0, b"01234");
    chunk.checksum = HashAlgorithm::Blake3.digest(b"tampered");

    // No `put` expectation: persisting the chunk would fail the test.
    let coordinator = coordinator(
        registry,
        MockChunkStore::new(),
        MockAssemblyEngine::new(),
        MockUploadEventNotifier::new(),
    );
    let err = coordinator.submit_chunk(chunk).await.unwrap_err();
    assert!(matches!(err, UploadException::ChunkChecksumMismatch { .. }));
}

#[tokio::test]
async fn duplicate_submission_releases_the_fresh_blob() {
    let session = open_session(b"0123456789", 2);
    let mut registry = MockSessionRegistry::new();
    let snapshot = session.clone();
    registry.expect_get().returning(move |_| Ok(snapshot.clone()));
    registry
        .expect_record_chunk()
        .returning(|_, _| Ok(RecordOutcome::DuplicateIgnored { remaining: 1 }));

    let mut chunk_store = MockChunkStore::new();
    chunk_store.expect_put().returning(|content| Ok(BlobHandle::from(format!("b{}", content.len()))));
    chunk_store.expect_delete().times(1).returning(|_| Ok(()));

    let coordinator = coordinator(
        registry,
        chunk_store,
        MockAssemblyEngine::new(),
        MockUploadEventNotifier::new(),
    );
    let outcome = coordinator.submit_chunk(chunk_of(&session, 0, b"01234")).await.unwrap();
    assert_eq!(SubmitOutcome::DuplicateIgnored { remaining: 1 }, outcome);
}

#[tokio::test]
async fn final_chunk_drives_assembly() {
    let session = open_session(b"0123456789", 2);
    let mut registry = MockSessionRegistry::new();
    let snapshot = session.clone();
    registry.expect_get().returning(move |_| Ok(snapshot.clone()));
    registry
        .expect_record_chunk()
        .returning(|_, _| Ok(RecordOutcome::Recorded { remaining: 0 }));

    let mut chunk_store = MockChunkStore::new();
    chunk_store.expect_put().returning(|_| Ok(BlobHandle::from("blob")));

    let mut assembly_engine = MockAssemblyEngine::new();
    assembly_engine
        .expect_try_assemble()
        .times(1)
        .returning(|_| Ok(AssembleOutcome::AlreadyAssembled));

    let coordinator = coordinator(
        registry,
        chunk_store,
        assembly_engine,
        MockUploadEventNotifier::new(),
    );
    let outcome = coordinator.submit_chunk(chunk_of(&session, 1, b"56789")).await.unwrap();
    assert_eq!(SubmitOutcome::Accepted { remaining: 0 }, outcome);
}

#[tokio::test]
async fn submission_to_terminal_session_is_rejected() {
    let mut session = open_session(b"0123456789", 2);
    session.try_transition(SessionState::Failed).unwrap();
    let mut registry = MockSessionRegistry::new();
    let snapshot = session.clone();
    registry.expect_get().returning(move |_| Ok(snapshot.clone()));

    let coordinator = coordinator(
        registry,
        MockChunkStore::new(),
        MockAssemblyEngine::new(),
        MockUploadEventNotifier::new(),
    );
    let err = coordinator.submit_chunk(chunk_of(&session, 0, b"01234")).await.unwrap_err();
    assert!(matches!(
        err,
        UploadException::SessionTerminal {
            state: SessionState::Failed,
            ..
        }
    ));
}

#[tokio::test]
async fn storage_failure_leaves_the_session_open_for_retry() {
    let session = open_session(b"0123456789", 2);
    let mut registry = MockSessionRegistry::new();
    let snapshot = session.clone();
    registry.expect_get().returning(move |_| Ok(snapshot.clone()));
    // Recording only happens on the retry, once the store recovered.
    registry
        .expect_record_chunk()
        .times(1)
        .returning(|_, _| Ok(RecordOutcome::Recorded { remaining: 1 }));

    let mut chunk_store = MockChunkStore::new();
    chunk_store.expect_put().times(1).returning(|_| Err(anyhow::anyhow!("disk full")));
    chunk_store.expect_put().times(1).returning(|_| Ok(BlobHandle::from("blob")));

    let coordinator = coordinator(
        registry,
        chunk_store,
        MockAssemblyEngine::new(),
        MockUploadEventNotifier::new(),
    );
    let err = coordinator.submit_chunk(chunk_of(&session, 0, b"01234")).await.unwrap_err();
    assert!(matches!(err, UploadException::Storage { .. }));

    let outcome = coordinator.submit_chunk(chunk_of(&session, 0, b"01234")).await.unwrap();
    assert_eq!(SubmitOutcome::Accepted { remaining: 1 }, outcome);
}

fn assembled_session(parts: &[&[u8]]) -> UploadSession {
    let whole: Vec<u8> = parts.concat();
    let mut session = open_session(&whole, parts.len() as u64);
    for (nth, part) in parts.iter().enumerate() {
        session.chunks.insert(
            nth as u64,
            ChunkRecord::received(
                nth as u64,
                part.len() as u64,
                &HashAlgorithm::Blake3.digest(part),
                BlobHandle::from(format!("part{nth}")),
            ),
        );
    }
    session
}

#[tokio::test]
async fn winner_assembles_and_completes() {
    let session = assembled_session(&[b"01234", b"56789"]);
    let declared = session.declared_hash.clone();

    let mut registry = MockSessionRegistry::new();
    registry.expect_begin_assembly().times(1).returning(|_| Ok(AssemblyClaim::Claimed));
    let snapshot = session.clone();
    registry.expect_get().returning(move |_| Ok(snapshot.clone()));
    let expected = declared.clone();
    registry
        .expect_mark_completed()
        .times(1)
        .withf(move |_, artifact| artifact.hash == expected && artifact.size == 10)
        .returning(|_, _| Ok(()));

    let mut chunk_store = MockChunkStore::new();
    chunk_store.expect_get().returning(|handle| {
        Ok(match handle.key() {
            "part0" => b"01234".to_vec(),
            _ => b"56789".to_vec(),
        })
    });
    chunk_store.expect_put().times(1).returning(|_| Ok(BlobHandle::from("artifact")));
    chunk_store.expect_delete().times(2).returning(|_| Ok(()));

    let mut notifier = MockUploadEventNotifier::new();
    notifier
        .expect_notify()
        .times(1)
        .withf(|event| matches!(event, UploadEvent::Completed { .. }))
        .returning(|_| Ok(()));

    let engine = AssemblyEngineImpl::builder()
        .registry(Arc::new(registry))
        .chunk_store(Arc::new(chunk_store))
        .notifier(Arc::new(notifier))
        .build();
    let outcome = engine.try_assemble(session.id).await.unwrap();
    match outcome {
        AssembleOutcome::Assembled(artifact) => {
            assert_eq!(declared, artifact.hash);
            assert_eq!("artifact", artifact.blob.key());
        }
        other => panic!("expected Assembled, got {other:?}"),
    }
}

#[tokio::test]
async fn tampered_content_fails_the_session_without_an_artifact() {
    let session = assembled_session(&[b"01234", b"56789"]);

    let mut registry = MockSessionRegistry::new();
    registry.expect_begin_assembly().times(1).returning(|_| Ok(AssemblyClaim::Claimed));
    let snapshot = session.clone();
    registry.expect_get().returning(move |_| Ok(snapshot.clone()));
    let failed = {
        let mut failed = session.clone();
        failed.state = SessionState::Failed;
        failed
    };
    registry
        .expect_mark_failed()
        .times(1)
        .returning(move |_, _| Ok(failed.clone()));

    let mut chunk_store = MockChunkStore::new();
    // One byte flipped in part1 after its chunk-level verification.
    chunk_store.expect_get().returning(|handle| {
        Ok(match handle.key() {
            "part0" => b"01234".to_vec(),
            _ => b"56780".to_vec(),
        })
    });
    // No `put` expectation: persisting a mismatched artifact would fail.
    chunk_store.expect_delete().times(2).returning(|_| Ok(()));

    let mut notifier = MockUploadEventNotifier::new();
    notifier
        .expect_notify()
        .times(1)
        .withf(|event| matches!(event, UploadEvent::Failed { .. }))
        .returning(|_| Ok(()));

    let engine = AssemblyEngineImpl::builder()
        .registry(Arc::new(registry))
        .chunk_store(Arc::new(chunk_store))
        .notifier(Arc::new(notifier))
        .build();
    assert_eq!(
        AssembleOutcome::ChecksumMismatch,
        engine.try_assemble(session.id).await.unwrap()
    );
}

#[tokio::test]
async fn abort_between_claim_and_completion_discards_the_artifact() {
    let session = assembled_session(&[b"01234", b"56789"]);

    let mut registry = MockSessionRegistry::new();
    registry.expect_begin_assembly().times(1).returning(|_| Ok(AssemblyClaim::Claimed));
    let snapshot = session.clone();
    registry.expect_get().returning(move |_| Ok(snapshot.clone()));
    // An abort failed the session while the winner was assembling.
    let id = session.id;
    registry.expect_mark_completed().times(1).returning(move |_, _| {
        Err(UploadException::InvalidTransition {
            session_id: id,
            from: SessionState::Failed,
            to: SessionState::Completed,
        })
    });

    let mut chunk_store = MockChunkStore::new();
    chunk_store.expect_get().returning(|handle| {
        Ok(match handle.key() {
            "part0" => b"01234".to_vec(),
            _ => b"56789".to_vec(),
        })
    });
    chunk_store.expect_put().times(1).returning(|_| Ok(BlobHandle::from("artifact")));
    // Only the orphaned artifact goes; the aborter already released the
    // chunk blobs.
    chunk_store
        .expect_delete()
        .times(1)
        .withf(|handle| handle.key() == "artifact")
        .returning(|_| Ok(()));

    // No notifier expectation: the abort already announced the failure.
    let engine = AssemblyEngineImpl::builder()
        .registry(Arc::new(registry))
        .chunk_store(Arc::new(chunk_store))
        .notifier(Arc::new(MockUploadEventNotifier::new()))
        .build();
    assert_eq!(AssembleOutcome::Aborted, engine.try_assemble(session.id).await.unwrap());
}

#[tokio::test]
async fn abort_during_a_failing_assembly_is_quiet() {
    let session = assembled_session(&[b"01234", b"56789"]);

    let mut registry = MockSessionRegistry::new();
    registry.expect_begin_assembly().times(1).returning(|_| Ok(AssemblyClaim::Claimed));
    let snapshot = session.clone();
    registry.expect_get().returning(move |_| Ok(snapshot.clone()));
    let id = session.id;
    registry.expect_mark_failed().times(1).returning(move |_, _| {
        Err(UploadException::SessionTerminal {
            session_id: id,
            state: SessionState::Failed,
        })
    });

    let mut chunk_store = MockChunkStore::new();
    // Tampered content, so assembly fails before any artifact is put.
    chunk_store.expect_get().returning(|handle| {
        Ok(match handle.key() {
            "part0" => b"01234".to_vec(),
            _ => b"56780".to_vec(),
        })
    });

    // No deletes and no events: the aborter already reclaimed the chunks
    // and announced the failure.
    let engine = AssemblyEngineImpl::builder()
        .registry(Arc::new(registry))
        .chunk_store(Arc::new(chunk_store))
        .notifier(Arc::new(MockUploadEventNotifier::new()))
        .build();
    assert_eq!(AssembleOutcome::Aborted, engine.try_assemble(session.id).await.unwrap());
}

#[tokio::test]
async fn losers_of_the_claim_have_no_side_effects() {
    let mut registry = MockSessionRegistry::new();
    registry.expect_begin_assembly().returning(|_| Ok(AssemblyClaim::AlreadyClaimed));

    // Neither the store nor the notifier may be touched.
    let engine = AssemblyEngineImpl::builder()
        .registry(Arc::new(registry))
        .chunk_store(Arc::new(MockChunkStore::new()))
        .notifier(Arc::new(MockUploadEventNotifier::new()))
        .build();
    assert_eq!(
        AssembleOutcome::AlreadyAssembled,
        engine.try_assemble(uuid::Uuid::new_v4()).await.unwrap()
    );
}
