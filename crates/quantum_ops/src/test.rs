// This code is part of Qiskit.
//
// (C) Copyright IBM 2025
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

/// Run `worker` inside a freshly built rayon pool that is dropped as soon as it returns.
///
/// The parallel paths of the dense and Jordan-Wigner code are normally gated on the operator size
/// and on the environment, so tests call their inner functions with the parallel flag set and wrap
/// them in this.  Using a scoped pool rather than the global one keeps Miri from reporting the
/// global worker threads as leaked.
pub fn in_scoped_thread_pool<F, T>(worker: F) -> Result<T, ::rayon::ThreadPoolBuildError>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    ::rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build_scoped(::rayon::ThreadBuilder::run, |pool| pool.install(worker))
}
